use clap::{Parser, Subcommand};
use justified_gal::backfill::{self, ImageProbe};
use justified_gal::catalog::{self, Catalog};
use justified_gal::config::{self, GalleryConfig};
use justified_gal::gallery::Gallery;
use justified_gal::page::GalleryPage;
use justified_gal::preload::{DecodeFetcher, PreloadCache};
use justified_gal::types::{CategoryId, Photo};
use justified_gal::{generate, output, session};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "justified-gal")]
#[command(about = "Justified photo gallery: layout, static pages, and a scripted lightbox")]
#[command(long_about = "\
Justified photo gallery: layout, static pages, and a scripted lightbox

Photos come from a catalog JSON file supplied by your data service:

  {
    \"photos\": [
      {\"id\": 1, \"name\": \"Dawn\", \"url\": \"/media/dawn.jpg\",
       \"width\": 1600, \"height\": 1000, \"category_id\": 3}
    ],
    \"categories\": [{\"id\": 3, \"name\": \"Landscapes\"}]
  }

Photos without width/height lay out at a 3:2 fallback ratio. Run 'backfill'
to read the real dimensions: http(s) URLs are downloaded, site-relative
URLs are read from files under --media-root.

Set RUST_LOG=debug to see preload and lightbox activity.

Run 'justified-gal gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Catalog JSON file
    #[arg(long, default_value = "catalog.json", global = true)]
    catalog: PathBuf,

    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Output directory for generated pages
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory that site-relative photo URLs resolve against
    #[arg(long, default_value = ".", global = true)]
    media_root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Narrow a command to one category's ordering.
#[derive(clap::Args, Clone)]
struct CategoryArgs {
    /// Category id (default: all photos)
    #[arg(long)]
    category: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the justified rows for one grid page
    Layout {
        /// Container width in px (default: layout.snapshot_width)
        #[arg(long)]
        width: Option<u32>,
        /// Grid page, 1-based
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[command(flatten)]
        category: CategoryArgs,
    },
    /// Render gallery, category, and photo pages to HTML
    Generate,
    /// Fill in missing photo dimensions from local image files
    Backfill {
        /// Report what would change without writing the catalog
        #[arg(long)]
        dry_run: bool,
    },
    /// Replay a JSON-lines session script through the gallery and lightbox
    View {
        /// Session script, one event per line
        script: PathBuf,
        #[command(flatten)]
        category: CategoryArgs,
    },
    /// Validate the catalog and config without generating anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Layout {
            width,
            page,
            category,
        } => {
            let config = config::load_config(&cli.config_dir)?;
            let catalog = catalog::load_catalog(&cli.catalog)?;
            let photos = ordering(&catalog, &category)?;
            let mut gallery = Gallery::new(photos, &config);
            gallery.set_width(width.unwrap_or(config.layout.snapshot_width));
            if page != 1 && !gallery.set_page(page) {
                return Err(format!(
                    "page {} out of range (1..={})",
                    page,
                    gallery.pagination().total_pages().max(1)
                )
                .into());
            }
            output::print_layout(
                &gallery.rows(),
                gallery.width(),
                gallery.sizing(),
                gallery.pagination(),
            );
        }
        Command::Generate => {
            let config = config::load_config(&cli.config_dir)?;
            let catalog = catalog::load_catalog(&cli.catalog)?;
            println!("==> Generating {}", cli.output.display());
            let report = generate::generate(&catalog, &config, &cli.output)?;
            output::print_generate_output(&report);
        }
        Command::Backfill { dry_run } => {
            let config = config::load_config(&cli.config_dir)?;
            init_thread_pool(&config);
            let probe = ImageProbe::new()?;
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_backfill_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = backfill::backfill_file(
                &cli.catalog,
                &cli.media_root,
                &probe,
                dry_run,
                Some(tx),
            );
            printer.join().ok();
            let summary = result?;
            println!("{}", output::format_backfill_summary(&summary));
            if dry_run && summary.changed() {
                println!("Dry run: {} left unchanged", cli.catalog.display());
            }
        }
        Command::View { script, category } => {
            let config = config::load_config(&cli.config_dir)?;
            let catalog = catalog::load_catalog(&cli.catalog)?;
            let photos = ordering(&catalog, &category)?;
            let events = session::load_script(&script)?;

            let fetcher =
                DecodeFetcher::new(&cli.media_root, config::effective_threads(&config.preload))?;
            let mut page = GalleryPage::new(photos, &config, PreloadCache::new(fetcher));
            let snapshots = session::replay(&mut page, events);
            output::print_snapshots(&snapshots);

            let preload = page.lightbox().preload();
            println!("Preloaded {} photos", preload.len());
        }
        Command::Check => {
            let config = config::load_config(&cli.config_dir)?;
            println!("==> Checking {}", cli.catalog.display());
            let catalog = catalog::load_catalog(&cli.catalog)?;
            output::print_check_output(&catalog);
            print_config_summary(&config, &catalog);
            println!("==> Catalog is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// The displayed ordering: every photo, or one category's photos.
fn ordering(catalog: &Catalog, args: &CategoryArgs) -> Result<Vec<Photo>, String> {
    match &args.category {
        None => Ok(catalog.photos.clone()),
        Some(raw) => {
            let id = CategoryId::from(raw.as_str());
            if catalog.category(&id).is_none() {
                return Err(format!("unknown category: {raw}"));
            }
            Ok(catalog.photos_in_category(&id))
        }
    }
}

/// Summarize how the config paginates this catalog.
fn print_config_summary(config: &GalleryConfig, catalog: &Catalog) {
    let pages = catalog
        .photos
        .len()
        .div_ceil(config.pagination.page_size.max(1));
    println!(
        "Config: page size {} ({} grid pages), snapshot width {}px",
        config.pagination.page_size,
        pages.max(1),
        config.layout.snapshot_width
    );
}

/// Initialize the rayon thread pool based on preload config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(config: &GalleryConfig) {
    let threads = config::effective_threads(&config.preload);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
