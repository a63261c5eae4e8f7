use clap::Parser;
use icon_dearchiver::{default_output_dir, extract_archive, ArchiveError,
                      IconArchive};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser, Debug)]
#[command(name = "icon-dearchiver")]
#[command(version, long_about = None)]
#[command(about = "Converts Icon Archiver files into .icns files")]
struct Args {
    /// Path to the Icon Archiver file
    input: PathBuf,

    /// Output directory (defaults to <input>.out)
    output: Option<PathBuf>,

    /// List the icons in the archive instead of extracting them
    #[arg(short, long)]
    list: bool,
}

fn set_up_tracing() {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .from_env_lossy())
        .init();
}

fn list_archive(input: &Path) -> Result<(), ArchiveError> {
    let data = fs::read(input)?;
    let archive = IconArchive::parse(&data)?;
    let header = archive.header();
    println!("Icon Archiver version {}, {} icon(s)",
             header.version.number(),
             header.icon_count);
    if let Some(ref extended) = header.extended {
        println!("Copyright: {}", extended.copyright);
        println!("Comment: {}", extended.comment);
        println!("Locked: {}", extended.locked);
    }
    for (index, result) in archive.records() {
        match result {
            Ok(decoded) => {
                let types: Vec<String> = decoded.icon_types()
                    .iter()
                    .map(|icon_type| {
                        let size = icon_type.pixel_size();
                        format!("{}({}x{})", icon_type, size, size)
                    })
                    .collect();
                println!("Icon {}: {:?} ({} byte data) {}",
                         index,
                         decoded.name(),
                         decoded.data().len(),
                         types.join(" "));
            }
            Err(error) => println!("Icon {}: skipped ({})", index, error),
        }
    }
    Ok(())
}

fn run(args: &Args) -> Result<(), ArchiveError> {
    if args.list {
        return list_archive(&args.input);
    }
    let output_dir = args.output
        .clone()
        .unwrap_or_else(|| default_output_dir(&args.input));
    let summary = extract_archive(&args.input, &output_dir)?;
    log::info!("wrote {} icon(s), skipped {}",
               summary.written.len(),
               summary.skipped.len());
    Ok(())
}

fn main() {
    set_up_tracing();
    let args = Args::parse();
    if let Err(error) = run(&args) {
        eprintln!("Error: {}: {}", args.input.display(), error);
        let code = match error {
            ArchiveError::UnsupportedFormat(_) |
            ArchiveError::UnsupportedVersion(_) => 2,
            _ => 1,
        };
        process::exit(code);
    }
}
