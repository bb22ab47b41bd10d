mod commands;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tadilat")]
#[command(version, about = "Site builder and lead intake for a renovation business", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Create site.toml and public/ in a new site directory
    Init {
        /// Path to site directory
        path: PathBuf,

        /// Business name
        #[arg(long)]
        name: Option<String>,

        /// Public site URL
        #[arg(long)]
        url: Option<String>,
    },

    /// Validate site configuration and assets
    Validate {
        /// Path to site directory
        path: PathBuf,
    },

    /// Build the static site
    Build {
        /// Path to site directory
        path: PathBuf,

        /// Output directory for generated site
        #[arg(short, long)]
        output: PathBuf,

        /// Skip the backend; blog and page overrides are left out
        #[arg(long)]
        offline: bool,
    },

    /// Serve the site locally with a working contact form
    Serve {
        /// Path to site directory
        path: PathBuf,

        /// Port to serve on
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Use an in-memory backend instead of the hosted one
        #[arg(long)]
        offline: bool,

        /// Reload the browser when files change
        #[arg(long)]
        live_reload: bool,
    },

    /// Admin panel: contacts, blog posts and page texts
    Admin {
        /// Path to site directory
        #[arg(short, long, default_value = ".")]
        site: PathBuf,

        #[command(subcommand)]
        command: AdminCommand,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
enum AdminCommand {
    /// Sign in and store the session in ~/.tadilat/session.toml
    Login {
        #[arg(long)]
        email: Option<String>,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Dashboard counters
    Stats,

    /// List contact requests, newest first
    Contacts {
        /// Only unread requests
        #[arg(long)]
        unread: bool,
    },

    /// Mark a contact request as read
    Read { id: String },

    /// List blog posts
    Posts,

    /// Create or update a blog post from a markdown file
    PostSave {
        /// Markdown body
        file: PathBuf,

        /// Update this post instead of creating one
        #[arg(long)]
        id: Option<String>,

        #[arg(long)]
        title: Option<String>,

        /// Derived from the title when omitted
        #[arg(long)]
        slug: Option<String>,

        #[arg(long)]
        excerpt: Option<String>,

        /// Featured image URL
        #[arg(long)]
        image: Option<String>,

        #[arg(long)]
        meta_title: Option<String>,

        #[arg(long)]
        meta_description: Option<String>,

        /// Publish the post
        #[arg(long, conflicts_with = "draft")]
        publish: bool,

        /// Keep the post unpublished
        #[arg(long)]
        draft: bool,
    },

    /// Delete a blog post
    PostDelete { id: String },

    /// Show the stored texts of a landing page
    Page { slug: String },

    /// Override the texts of a landing page
    PageSave {
        slug: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        heading: Option<String>,

        /// Body text file; paragraphs separated by blank lines
        #[arg(long)]
        body: Option<PathBuf>,

        #[arg(long)]
        meta_title: Option<String>,

        #[arg(long)]
        meta_description: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Command::Init { path, name, url } => commands::init::run(path, name, url).await,
        Command::Validate { path } => commands::validate::run(path).await,
        Command::Build {
            path,
            output,
            offline,
        } => commands::build::run(path, output, offline).await,
        Command::Serve {
            path,
            port,
            offline,
            live_reload,
        } => commands::serve::run(path, port, offline, live_reload).await,
        Command::Admin { site, command } => match command {
            AdminCommand::Login { email } => commands::admin::login(site, email).await,
            AdminCommand::Logout => commands::admin::logout(site).await,
            AdminCommand::Stats => commands::admin::stats(site).await,
            AdminCommand::Contacts { unread } => commands::admin::contacts(site, unread).await,
            AdminCommand::Read { id } => commands::admin::read(site, id).await,
            AdminCommand::Posts => commands::admin::posts(site).await,
            AdminCommand::PostSave {
                file,
                id,
                title,
                slug,
                excerpt,
                image,
                meta_title,
                meta_description,
                publish,
                draft,
            } => {
                let edit = commands::admin::PostEdit {
                    file,
                    id,
                    title,
                    slug,
                    excerpt,
                    image,
                    meta_title,
                    meta_description,
                    published: if publish {
                        Some(true)
                    } else if draft {
                        Some(false)
                    } else {
                        None
                    },
                };
                commands::admin::post_save(site, edit).await
            }
            AdminCommand::PostDelete { id } => commands::admin::post_delete(site, id).await,
            AdminCommand::Page { slug } => commands::admin::page(site, slug).await,
            AdminCommand::PageSave {
                slug,
                title,
                heading,
                body,
                meta_title,
                meta_description,
            } => {
                let edit = commands::admin::PageEdit {
                    title,
                    heading,
                    body,
                    meta_title,
                    meta_description,
                };
                commands::admin::page_save(site, slug, edit).await
            }
        },
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "tadilat", &mut io::stdout());
            Ok(())
        }
    }
}
