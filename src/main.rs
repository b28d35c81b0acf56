use clap::{Parser, Subcommand};
use gallerist::backend::StandardBackend;
use gallerist::{config, logic, render};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gallerist")]
#[command(about = "Static photo and video gallery generator")]
#[command(long_about = "\
Static photo and video gallery generator

A gallery is a directory with a gallery.json at its root. Local galleries
keep their media under public/images/photos; remote galleries point at a
shared album link (Google Photos or OneDrive) instead.

Gallery structure:

  my-gallery/
  ├── gallery.json                 # Config: title, paths, thumbnail height
  └── public/
      ├── images/
      │   ├── photos/              # Your media (jpg, jpeg, gif, png, mp4)
      │   └── thumbnails/          # Generated thumbnails
      ├── images_data.json         # Metadata document (descriptions editable)
      └── index.html               # Rendered gallery page

Edit descriptions directly in images_data.json — they survive rebuilds as
long as the underlying file is unchanged.")]
#[command(version)]
struct Cli {
    /// Gallery root directory
    #[arg(long, default_value = ".", global = true)]
    path: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new gallery skeleton with a default gallery.json
    Init {
        /// Gallery title
        #[arg(long, default_value = "My Gallery")]
        title: String,
        /// Gallery description
        #[arg(long, default_value = "")]
        description: String,
        /// Link to a remote shared album (OneDrive or Google Photos)
        #[arg(long)]
        remote_link: Option<String>,
    },
    /// Synchronize thumbnails and metadata, then render index.html
    Build {
        /// Regenerate all thumbnails
        #[arg(short, long)]
        force_thumbnails: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Init {
            title,
            description,
            remote_link,
        } => {
            let remote = match remote_link {
                Some(link) => match logic::detect_remote_type(&link) {
                    Some(remote_type) => Some((remote_type.to_string(), link)),
                    None => {
                        return Err(
                            "cannot initialize remote gallery - please check the provided link"
                                .into(),
                        )
                    }
                },
                None => None,
            };
            let config = config::init_gallery(&cli.path, &title, &description, remote)?;
            println!("Gallery initialized in {}", config.root.display());
        }
        Command::Build { force_thumbnails } => {
            let config = config::GalleryConfig::load(&cli.path)?;
            let gallery = logic::for_config(&config);
            let backend = StandardBackend::new();

            println!("==> Generating thumbnails");
            gallery.create_thumbnails(&backend, force_thumbnails)?;

            println!("==> Synchronizing metadata");
            let document = logic::synchronize(&config, gallery.as_ref(), &backend)?;

            println!("==> Rendering HTML");
            let index = render::write_index(&config, &document)?;
            println!("==> Build complete: {}", index.display());
        }
    }

    Ok(())
}
