use clap::{Parser, Subcommand, ValueEnum};
use content_desk::classify::{build_template, default_template, sample_document};
use content_desk::config::{self, DeskConfig};
use content_desk::edit::{delete_content, plan_rename, rename_post};
use content_desk::frontmatter::{FrontmatterValue, parse_document, update_frontmatter};
use content_desk::images::list_images;
use content_desk::naming::{markdown_image, public_image_url};
use content_desk::output;
use content_desk::posts::{list_posts, render_preview};
use content_desk::scan::{
    ScanTarget, scan_for_matching_directories, suggest_image_directories,
    suggest_post_directories,
};
use content_desk::site_url::detect_production_url;
use content_desk::source::{ContentSource, GithubSource, LocalSource, RepoRef};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("CONTENT_DESK_RELEASE");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("CONTENT_DESK_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "content-desk")]
#[command(about = "Manage posts and images of a GitHub-hosted static site")]
#[command(long_about = "\
Manage posts and images of a GitHub-hosted static site

Works on a local checkout (--repo) or directly against GitHub (--github).
Astro-style layouts are detected out of the box:

  astro.config.mjs                 # site: 'https://...' → production URL
  public/images/                   # Preferred image directory
  src/
  ├── content/posts/               # Posts: .md / .mdx with --- frontmatter
  ├── data/post/                   # Fallback post directory
  └── pages/                       # Routing, never scanned for posts

Frontmatter values on the command line use the same syntax as in a post:
  title=\"Hello World\"   tags=[astro, rust]   image=   (empty removes the key)

Run 'content-desk gen-config' to generate a documented content-desk.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Local repository checkout
    #[arg(long, default_value = ".", global = true)]
    repo: PathBuf,

    /// Read from GitHub instead (owner/repo or https://github.com/owner/repo)
    #[arg(long, global = true)]
    github: Option<RepoRef>,

    /// Branch to read from GitHub (default branch when omitted)
    #[arg(long, global = true, requires = "github")]
    branch: Option<String>,

    /// Config file (default: content-desk.toml in the checkout, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScanKind {
    Posts,
    Images,
}

#[derive(Subcommand)]
enum Command {
    /// Suggest post and image directories for this repository
    Suggest,
    /// List every directory holding posts or images, unranked
    Scan {
        kind: ScanKind,
        /// Start directory (default from config)
        #[arg(long)]
        root: Option<String>,
        /// Directory levels to list (default from config)
        #[arg(long)]
        depth: Option<usize>,
    },
    /// Show a post's frontmatter, thumbnail and body size
    Show {
        file: String,
        /// Print the body rendered as HTML instead
        #[arg(long)]
        html: bool,
    },
    /// Set or remove frontmatter keys (local checkout only)
    Set {
        file: String,
        /// key=value pairs; an empty value removes the key
        #[arg(required = true, value_parser = parse_assignment)]
        assignments: Vec<(String, Option<FrontmatterValue>)>,
        /// Print the updated document instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Retitle a post and rename its file to match (local checkout only)
    Rename {
        file: String,
        title: String,
        /// Use this slug instead of one derived from the title
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Infer a frontmatter template from an example post
    Template {
        /// Example post (built-in template when omitted)
        file: Option<String>,
        /// Print a ready-to-edit sample post instead of the field types
        #[arg(long)]
        sample: bool,
    },
    /// List the posts in a directory, newest first
    Posts { dir: String },
    /// Delete a post or image file (local checkout only)
    Delete { file: String },
    /// List the images in a directory with their public URLs
    Images {
        /// Image directory (default: images.pin from config)
        dir: Option<String>,
        /// Only names containing this text, ignoring case
        #[arg(long)]
        search: Option<String>,
    },
    /// URL and Markdown snippet for an uploaded image
    ImageUrl {
        file_name: String,
        /// Image directory (default: images.pin from config)
        #[arg(long)]
        dir: Option<String>,
    },
    /// Detect the production URL from the site's config files
    SiteUrl,
    /// Print a stock content-desk.toml with all options documented
    GenConfig,
}

/// Parse `key=value` as typed on the command line.
fn parse_assignment(s: &str) -> Result<(String, Option<FrontmatterValue>), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    let value = value.trim();
    let value = (!value.is_empty()).then(|| FrontmatterValue::from_inline(value));
    Ok((key.to_string(), value))
}

enum Repo {
    Local(LocalSource),
    Github(GithubSource),
}

impl Repo {
    fn source(&self) -> &dyn ContentSource {
        match self {
            Repo::Local(source) => source,
            Repo::Github(source) => source,
        }
    }

    fn local(&self) -> Result<&LocalSource, Box<dyn std::error::Error>> {
        match self {
            Repo::Local(source) => Ok(source),
            Repo::Github(source) => Err(format!(
                "{} is remote; editing requires a local checkout (--repo)",
                source.repo()
            )
            .into()),
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "content_desk=debug"
        } else {
            "content_desk=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<DeskConfig, config::ConfigError> {
    match &cli.config {
        Some(path) => config::load_config_file(path),
        None if cli.github.is_some() => config::load_config(Path::new(".")),
        None => config::load_config(&cli.repo),
    }
}

fn open_repo(cli: &Cli, config: &DeskConfig) -> Result<Repo, Box<dyn std::error::Error>> {
    let Some(repo) = &cli.github else {
        return Ok(Repo::Local(LocalSource::new(&cli.repo)));
    };
    let token = std::env::var(&config.github.token_env)
        .ok()
        .filter(|t| !t.is_empty());
    if token.is_none() {
        tracing::debug!(env = %config.github.token_env, "no token set, using anonymous access");
    }
    let mut source = GithubSource::new(&config.github.api_base, repo.clone(), token)?;
    if let Some(branch) = &cli.branch {
        source = source.with_branch(branch);
    }
    Ok(Repo::Github(source))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let repo = open_repo(&cli, &config)?;
    let source = repo.source();

    match &cli.command {
        Command::Suggest => {
            let (posts, images) = tokio::try_join!(
                suggest_post_directories(source, &config),
                suggest_image_directories(source, &config),
            )?;
            if cli.json {
                print_json(&serde_json::json!({ "posts": posts, "images": images }))?;
            } else {
                output::print_suggestions("Post directories", &posts);
                println!();
                output::print_suggestions("Image directories", &images);
            }
        }
        Command::Scan { kind, root, depth } => {
            let (target, default_root, default_depth) = match kind {
                ScanKind::Posts => (
                    ScanTarget::posts_from(&config),
                    &config.posts.root,
                    config.posts.max_depth,
                ),
                ScanKind::Images => (
                    ScanTarget::images_from(&config),
                    &config.images.root,
                    config.images.max_depth,
                ),
            };
            let root = root.as_deref().unwrap_or(default_root);
            let depth = depth.unwrap_or(default_depth);
            let found = scan_for_matching_directories(source, root, depth, &target).await?;
            if cli.json {
                print_json(&found)?;
            } else {
                output::print_scan(root, depth, &found);
            }
        }
        Command::Show { file, html } => {
            let doc = parse_document(&source.read_file(file).await?);
            if *html {
                print!("{}", render_preview(&doc.body));
            } else if cli.json {
                print_json(&doc)?;
            } else {
                output::print_document(file, &doc);
            }
        }
        Command::Set {
            file,
            assignments,
            dry_run,
        } => {
            let local = repo.local()?;
            let raw = local.read_file(file).await?;
            let updated = update_frontmatter(&raw, assignments.iter().cloned());
            if *dry_run {
                print!("{}", updated);
            } else if updated == raw {
                println!("{file}: unchanged");
            } else {
                local.write_file(file, &updated).await?;
                println!("{file}: updated {} key(s)", assignments.len());
            }
        }
        Command::Rename {
            file,
            title,
            slug,
            dry_run,
        } => {
            let local = repo.local()?;
            if *dry_run {
                let plan = plan_rename(local, file, title, slug.as_deref()).await?;
                println!("{} → {}", plan.from, plan.to);
                print!("{}", plan.contents);
                return Ok(());
            }
            let plan = rename_post(local, file, title, slug.as_deref()).await?;
            println!("{} → {}", plan.from, plan.to);
        }
        Command::Template { file, sample } => {
            let template = match file {
                Some(file) => build_template(&parse_document(&source.read_file(file).await?).frontmatter),
                None => default_template(),
            };
            if *sample {
                print!("{}", sample_document(&template, chrono::Local::now().date_naive()));
            } else if cli.json {
                print_json(&template)?;
            } else {
                output::print_template(&template);
            }
        }
        Command::Posts { dir } => {
            let posts = list_posts(source, dir, &ScanTarget::posts_from(&config)).await?;
            if cli.json {
                print_json(&posts)?;
            } else {
                output::print_posts(dir, &posts);
            }
        }
        Command::Delete { file } => {
            let local = repo.local()?;
            let removed = delete_content(local, file, &config).await?;
            println!("{removed}: deleted");
        }
        Command::Images { dir, search } => {
            let dir = dir.as_deref().unwrap_or(&config.images.pin);
            let mut images = list_images(source, dir, &ScanTarget::images_from(&config)).await?;
            if let Some(query) = search {
                images.retain(|image| image.matches_search(query));
            }
            if cli.json {
                print_json(&images)?;
            } else {
                output::print_images(dir, &images);
            }
        }
        Command::ImageUrl { file_name, dir } => {
            let dir = dir.as_deref().unwrap_or(&config.images.pin);
            let url = public_image_url(dir, file_name);
            if cli.json {
                print_json(&serde_json::json!({ "url": url, "markdown": markdown_image(&url) }))?;
            } else {
                println!("{url}");
                println!("{}", markdown_image(&url));
            }
        }
        Command::SiteUrl => match detect_production_url(source).await {
            Some(url) if cli.json => print_json(&serde_json::json!({ "url": url }))?,
            Some(url) => println!("{url}"),
            None if cli.json => print_json(&serde_json::json!({ "url": null }))?,
            None => {
                eprintln!("No production URL found");
                std::process::exit(1);
            }
        },
        Command::GenConfig => unreachable!("handled before the repository is opened"),
    }

    Ok(())
}
