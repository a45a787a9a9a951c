//! Livemark - render Markdown to a themed HTML preview.
//!
//! # Usage
//!
//! ```bash
//! livemark notes.md > notes.html
//! livemark --watch -o preview.html notes.md
//! livemark --theme light --save
//! livemark --tree ~/notes
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use livemark::app::App;
use livemark::config::{
    Settings, clear_settings, global_config_path, load_layered, load_settings,
    local_override_path, save_settings,
};
use livemark::theme::Theme;
use livemark::workspace;

/// Markdown editor core with a debounced live HTML preview
#[derive(Parser, Debug)]
#[command(name = "livemark", version, about, long_about = None)]
struct Cli {
    /// Markdown file to render (an empty document if omitted)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Preview theme: dark, light, blue, or a stylesheet key
    #[arg(long, value_name = "THEME")]
    theme: Option<Theme>,

    /// Directory to read theme stylesheets from
    #[arg(long, value_name = "DIR")]
    themes_dir: Option<PathBuf>,

    /// Quiet period before re-rendering, in milliseconds
    #[arg(long, value_name = "MS")]
    debounce_ms: Option<u64>,

    /// Write the page here instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Watch FILE and re-render after changes
    #[arg(short, long, requires = "output")]
    watch: bool,

    /// Print the Markdown file tree of DIR (default: last working folder)
    #[arg(long, value_name = "DIR")]
    tree: Option<Option<PathBuf>>,

    /// Save the given options as defaults in the global config
    #[arg(long)]
    save: bool,

    /// Remove the global config
    #[arg(long)]
    clear: bool,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            theme: self.theme.clone(),
            themes_dir: self.themes_dir.clone(),
            debounce_ms: self.debounce_ms,
            ..Settings::default()
        }
    }
}

fn print_tree(dir: Option<PathBuf>, global_path: &Path, file: &Settings) -> Result<()> {
    let dir = dir
        .or_else(|| file.last_working_folder.clone())
        .context("No working folder set; pass --tree DIR")?;
    let tree = workspace::scan(&dir)
        .with_context(|| format!("Failed to read folder {}", dir.display()))?;
    print!("{tree}");

    let mut saved = load_settings(global_path)?;
    saved.last_working_folder = Some(dir);
    save_settings(global_path, &saved)
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_settings = cli.settings();

    if cli.clear {
        clear_settings(&global_path)?;
    }
    if cli.save {
        let saved = load_settings(&global_path)?.union(&cli_settings);
        save_settings(&global_path, &saved)?;
        tracing::info!(path = %global_path.display(), "saved settings");
    }

    let file_settings = if cli.clear {
        Settings::default()
    } else {
        load_layered(&global_path, &local_path)?
    };
    let effective = file_settings.union(&cli_settings);

    if let Some(dir) = cli.tree {
        return print_tree(dir, &global_path, &effective);
    }
    if (cli.save || cli.clear) && cli.file.is_none() {
        return Ok(());
    }

    let app = App::new(cli.file)
        .with_output(cli.output)
        .with_watch(cli.watch)
        .with_theme(effective.theme_or_default())
        .with_themes_dir(effective.themes_dir.clone())
        .with_debounce_ms(effective.debounce_delay());

    app.run().context("Application error")
}
