use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use coverforge::{
    ArtClient, CoverCatalog, CoverData, EditorState, FontFamily, FontRegistry, Genre,
    JsonFileStore, Slot, TemplateKey, export_cover, mailto_draft,
};

#[derive(Parser, Debug)]
#[command(name = "coverforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate background artwork and write a fresh working cover JSON.
    Generate(GenerateArgs),
    /// Apply edits to a working cover JSON.
    Edit(EditArgs),
    /// Export a working cover as a PNG at its template's pixel dimensions.
    Export(ExportArgs),
    /// Save a working cover into the catalog.
    Save(SaveArgs),
    /// List saved covers, newest first.
    List(CatalogArgs),
    /// Delete a saved cover by id.
    Delete(DeleteArgs),
    /// Load a saved cover back into a working cover JSON.
    Load(LoadArgs),
    /// Print a mailto: draft URL for a working cover.
    Share(ShareArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Book title (may be empty).
    #[arg(long, default_value = "")]
    title: String,

    /// Author name (may be empty).
    #[arg(long, default_value = "")]
    author: String,

    /// Genre, e.g. "Horror" or "Science Fiction".
    #[arg(long)]
    genre: Genre,

    /// Template key, e.g. "ebook" or "kdpPaperback".
    #[arg(long, default_value = "ebook")]
    template: TemplateKey,

    /// Output working cover JSON.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct EditArgs {
    /// Input working cover JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output path; defaults to editing in place.
    #[arg(long)]
    out: Option<PathBuf>,

    #[arg(long)]
    title_text: Option<String>,
    #[arg(long)]
    title_font: Option<FontFamily>,
    #[arg(long)]
    title_size: Option<f32>,
    #[arg(long)]
    title_color: Option<String>,
    #[arg(long)]
    title_top: Option<f32>,

    #[arg(long)]
    author_text: Option<String>,
    #[arg(long)]
    author_font: Option<FontFamily>,
    #[arg(long)]
    author_size: Option<f32>,
    #[arg(long)]
    author_color: Option<String>,
    #[arg(long)]
    author_top: Option<f32>,

    #[arg(long)]
    genre: Option<Genre>,
    #[arg(long)]
    template: Option<TemplateKey>,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input working cover JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory the PNG is written into; the file name comes from the title.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Directory containing the registered font files.
    #[arg(long, default_value = "assets/fonts")]
    fonts: PathBuf,
}

#[derive(Parser, Debug)]
struct SaveArgs {
    /// Input working cover JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Catalog JSON file.
    #[arg(long)]
    catalog: PathBuf,
}

#[derive(Parser, Debug)]
struct CatalogArgs {
    /// Catalog JSON file.
    #[arg(long)]
    catalog: PathBuf,
}

#[derive(Parser, Debug)]
struct DeleteArgs {
    /// Catalog JSON file.
    #[arg(long)]
    catalog: PathBuf,

    /// Id of the record to delete.
    #[arg(long)]
    id: String,
}

#[derive(Parser, Debug)]
struct LoadArgs {
    /// Catalog JSON file.
    #[arg(long)]
    catalog: PathBuf,

    /// Id of the record to load.
    #[arg(long)]
    id: String,

    /// Output working cover JSON.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ShareArgs {
    /// Input working cover JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Edit(args) => cmd_edit(args),
        Command::Export(args) => cmd_export(args),
        Command::Save(args) => cmd_save(args),
        Command::List(args) => cmd_list(args),
        Command::Delete(args) => cmd_delete(args),
        Command::Load(args) => cmd_load(args),
        Command::Share(args) => cmd_share(args),
    }
}

fn read_cover_json(path: &Path) -> anyhow::Result<CoverData> {
    let f = File::open(path).with_context(|| format!("open cover '{}'", path.display()))?;
    let r = BufReader::new(f);
    let cover: CoverData = serde_json::from_reader(r).with_context(|| "parse cover JSON")?;
    cover.validate()?;
    Ok(cover)
}

fn write_cover_json(path: &Path, cover: &CoverData) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("write cover '{}'", path.display()))?;
    serde_json::to_writer_pretty(f, cover).with_context(|| "encode cover JSON")?;
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let mut editor = EditorState::new(args.genre, args.template);
    editor.set_text(Slot::Title, args.title.clone());
    editor.set_text(Slot::Author, args.author.clone());

    let client = ArtClient::from_env()?;
    editor.begin_generation()?;
    let result = client.generate(
        &args.title,
        &args.author,
        args.genre,
        args.template.details(),
    );
    editor.finish_generation();
    editor.set_background(result?);

    write_cover_json(&args.out, &editor.snapshot())?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_edit(args: EditArgs) -> anyhow::Result<()> {
    let cover = read_cover_json(&args.in_path)?;
    let mut editor = EditorState::new(cover.genre, cover.template_key);
    editor.load(cover);

    for (slot, text) in [
        (Slot::Title, &args.title_text),
        (Slot::Author, &args.author_text),
    ] {
        if let Some(text) = text {
            editor.set_text(slot, text.clone());
        }
    }
    for (slot, font) in [
        (Slot::Title, args.title_font),
        (Slot::Author, args.author_font),
    ] {
        if let Some(font) = font {
            editor.set_font(slot, font)?;
        }
    }
    for (slot, size) in [
        (Slot::Title, args.title_size),
        (Slot::Author, args.author_size),
    ] {
        if let Some(size) = size {
            editor.set_size(slot, size)?;
        }
    }
    for (slot, color) in [
        (Slot::Title, &args.title_color),
        (Slot::Author, &args.author_color),
    ] {
        if let Some(color) = color {
            editor.set_color(slot, color.clone())?;
        }
    }
    for (slot, top) in [(Slot::Title, args.title_top), (Slot::Author, args.author_top)] {
        if let Some(top) = top {
            editor.set_top(slot, top)?;
        }
    }
    if let Some(genre) = args.genre {
        editor.set_genre(genre);
    }
    if let Some(template) = args.template {
        editor.set_template(template);
    }

    let out = args.out.unwrap_or(args.in_path);
    write_cover_json(&out, &editor.snapshot())?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let cover = read_cover_json(&args.in_path)?;
    let mut fonts = FontRegistry::new(&args.fonts);

    let Some(exported) = export_cover(&cover, &mut fonts)? else {
        eprintln!("nothing to export: cover has no background image");
        return Ok(());
    };

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    let out_path = args.out_dir.join(&exported.file_name);
    std::fs::write(&out_path, &exported.png)
        .with_context(|| format!("write png '{}'", out_path.display()))?;

    eprintln!("wrote {}", out_path.display());
    Ok(())
}

fn cmd_save(args: SaveArgs) -> anyhow::Result<()> {
    let cover = read_cover_json(&args.in_path)?;
    let mut catalog = CoverCatalog::open(JsonFileStore::new(&args.catalog));
    let record = catalog.save(cover)?;
    eprintln!("saved {}", record.id);
    Ok(())
}

fn cmd_list(args: CatalogArgs) -> anyhow::Result<()> {
    let catalog = CoverCatalog::open(JsonFileStore::new(&args.catalog));
    for record in catalog.list() {
        let title = if record.data.title.text.is_empty() {
            "(untitled)"
        } else {
            record.data.title.text.as_str()
        };
        println!(
            "{}  {}  {}  {}",
            record.id,
            record.created_at.to_rfc3339(),
            record.data.template_key,
            title
        );
    }
    Ok(())
}

fn cmd_delete(args: DeleteArgs) -> anyhow::Result<()> {
    let mut catalog = CoverCatalog::open(JsonFileStore::new(&args.catalog));
    if catalog.delete(&args.id)? {
        eprintln!("deleted {}", args.id);
    } else {
        eprintln!("no record with id {}", args.id);
    }
    Ok(())
}

fn cmd_load(args: LoadArgs) -> anyhow::Result<()> {
    let catalog = CoverCatalog::open(JsonFileStore::new(&args.catalog));
    let cover = catalog
        .load(&args.id)
        .with_context(|| format!("no record with id '{}'", args.id))?;
    write_cover_json(&args.out, &cover)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_share(args: ShareArgs) -> anyhow::Result<()> {
    let cover = read_cover_json(&args.in_path)?;
    println!("{}", mailto_draft(&cover));
    Ok(())
}
