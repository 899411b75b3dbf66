/// # nickpack CLI Interface (Module)
///
/// This module implements the full CLI interface for nickpack — handling
/// command parsing, argument validation, main entrypoints, and
/// user-visible invocations.
///
/// All core business logic (typography, composition, archiving,
/// distribution) lives in the [`nickpack-core`] crate. This module is
/// strictly for CLI glue, ergonomic argument exposure, and orchestration.
///
/// ## Features
/// - Entry struct [`Cli`] defines all user-facing options and subcommands.
/// - `watch` runs the long-poll event loop against the configured post.
/// - `build` composes and archives one bundle locally, without touching
///   the platform at all — the pipeline's independent entry point.
/// - Async entrypoint (`run`) for programmatic invocation and integration
///   testing.
///
/// [`nickpack-core`]: ../../nickpack-core/
use crate::event::{EventLoopConfig, EventSource};
use crate::load_config::load_config;
use crate::upload::{ReplyClient, UploadClient};
use anyhow::Result;
use clap::{Parser, Subcommand};
use nickpack_core::archive::pack_bundle;
use nickpack_core::compose::Composer;
use nickpack_core::config::AssetConfig;
use nickpack_core::handler::Pipeline;
use nickpack_core::trigger::{sanitize_nickname, TriggerMatcher};
use std::path::PathBuf;
use std::sync::Arc;

/// CLI for nickpack: watch for nickname requests and reply with bundles.
#[derive(Parser)]
#[clap(
    name = "nickpack",
    version,
    about = "Watch a post for nickname requests and reply with branded image bundles"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Subscribe to comment events and serve trigger requests
    Watch {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
    /// Build one bundle locally and write the images plus the archive
    Build {
        /// Requested nickname (sanitized before use)
        #[clap(long)]
        nickname: String,
        /// Directory holding the templates and the brand font
        #[clap(long, default_value = "assets")]
        assets: PathBuf,
        /// Output directory for the composed files
        #[clap(long, default_value = "out")]
        out: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Watch { config } => {
            let config = load_config(config)?;
            tracing::info!(command = "watch", "Starting watch loop");

            let matcher = TriggerMatcher::new(config.watch.post_id.as_str(), &config.watch.label)?;
            let assets = AssetConfig::from_dir(&config.assets.dir);
            assets.trace_loaded();
            let composer = Composer::new(assets)?;

            let uploader = UploadClient::new(
                &config.api.base_url,
                &config.api.version,
                &config.upload_token,
            );
            let replies = ReplyClient::new(
                &config.api.base_url,
                &config.api.version,
                &config.reply_token,
            );
            let pipeline = Arc::new(Pipeline::new(
                matcher,
                composer,
                config.pacing,
                Arc::new(uploader),
                Arc::new(replies),
            ));

            let source = EventSource::new(EventLoopConfig {
                base_url: config.api.base_url.clone(),
                version: config.api.version.clone(),
                token: config.upload_token.clone(),
                group_id: config.api.group_id,
                wait_secs: config.api.poll_wait_secs,
            });
            source.run(pipeline).await
        }
        Commands::Build {
            nickname,
            assets,
            out,
        } => {
            let nickname = sanitize_nickname(&nickname);
            if nickname.is_empty() {
                return Err(anyhow::anyhow!(
                    "nickname is empty after sanitization; nothing to build"
                ));
            }
            tracing::info!(command = "build", nickname, "Building bundle locally");

            let composer = Composer::new(AssetConfig::from_dir(&assets))?;
            let bundle = composer.build_bundle(&nickname)?;
            let archive = pack_bundle(&bundle, &nickname)?;

            std::fs::create_dir_all(&out)?;
            let outputs = [
                (format!("{nickname}_avatar.png"), &bundle.avatar),
                (format!("{nickname}_cover_primary.png"), &bundle.cover_primary),
                (
                    format!("{nickname}_cover_secondary.png"),
                    &bundle.cover_secondary,
                ),
                (format!("{nickname}_bundle.tar.gz"), &archive),
            ];
            for (name, content) in outputs {
                let path = out.join(&name);
                std::fs::write(&path, content)?;
                tracing::info!(path = %path.display(), bytes = content.len(), "Wrote output");
            }
            Ok(())
        }
    }
}
