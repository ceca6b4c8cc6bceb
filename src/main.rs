// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Proteus CLI entrypoint.
//!
//! Runs the project browser modal over the built-in demo project and prints
//! the submit payload as JSON on success. `--config` swaps in a host
//! configuration read from a JSON file.

use std::error::Error;
use std::time::Duration;

use tokio::sync::mpsc;

use proteus::model::{DocumentId, ModalConfig};
use proteus::project::demo::{demo_config, demo_project, DemoLoader, DemoResolver};
use proteus::tui::{run_modal, ModalOutcome};

const DEFAULT_LOAD_DELAY_MS: u64 = 600;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--multi] [--delay-ms <millis>] [--drop <document-id>]\n  {program} --config <file.json> [--delay-ms <millis>] [--drop <document-id>]\n\nBrowses the built-in demo project. --multi switches the modal to checkbox\nselection; --config replaces the demo configuration with one read from a\nJSON file.\n\n--delay-ms sets the simulated remote latency (default {DEFAULT_LOAD_DELAY_MS}).\n--drop removes a document from the simulated remote, so selecting it shows\nthe broken-document state."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    multi: bool,
    config_path: Option<String>,
    delay_ms: Option<u64>,
    drop_document: Option<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--multi" => {
                if options.multi {
                    return Err(());
                }
                options.multi = true;
            }
            "--config" => {
                if options.config_path.is_some() {
                    return Err(());
                }
                let path = args.next().ok_or(())?;
                options.config_path = Some(path);
            }
            "--delay-ms" => {
                if options.delay_ms.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let millis: u64 = raw.parse().map_err(|_| ())?;
                options.delay_ms = Some(millis);
            }
            "--drop" => {
                if options.drop_document.is_some() {
                    return Err(());
                }
                let document_id = args.next().ok_or(())?;
                options.drop_document = Some(document_id);
            }
            _ => return Err(()),
        }
    }

    if options.multi && options.config_path.is_some() {
        return Err(());
    }

    Ok(options)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "proteus".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let config = match &options.config_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                serde_json::from_str::<ModalConfig>(&raw)?
            }
            None => demo_config(options.multi),
        };

        let (project, mut remote) = demo_project();
        if let Some(document_id) = &options.drop_document {
            remote.remove(&document_id.parse::<DocumentId>()?);
        }
        let delay = Duration::from_millis(options.delay_ms.unwrap_or(DEFAULT_LOAD_DELAY_MS));

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        let outcome = runtime.block_on(async move {
            let handle = tokio::runtime::Handle::current();
            let (load_tx, load_rx) = mpsc::unbounded_channel();
            let (enablement_tx, enablement_rx) = mpsc::unbounded_channel();
            let loader = Box::new(DemoLoader::new(handle.clone(), load_tx, remote, delay));
            let resolver = Box::new(DemoResolver::new(handle, enablement_tx, delay));

            tokio::task::spawn_blocking(move || {
                run_modal(project, config, loader, resolver, load_rx, enablement_rx)
                    .map_err(|err| err.to_string())
            })
            .await
        })?;

        match outcome.map_err(|err| {
            Box::new(std::io::Error::new(std::io::ErrorKind::Other, err)) as Box<dyn Error>
        })? {
            ModalOutcome::Submitted(payload) => {
                println!("{}", serde_json::to_string_pretty(&payload)?);
            }
            ModalOutcome::Cancelled => {
                eprintln!("proteus: cancelled");
            }
        }

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("proteus: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, CliOptions};

    #[test]
    fn parses_empty_args() {
        let options = parse_options(std::iter::empty()).expect("parse options");
        assert_eq!(options, CliOptions::default());
    }

    #[test]
    fn parses_multi_flag() {
        let options = parse_options(["--multi".to_owned()].into_iter()).expect("parse options");
        assert!(options.multi);
        assert!(options.config_path.is_none());
    }

    #[test]
    fn parses_config_path() {
        let options = parse_options(["--config".to_owned(), "modal.json".to_owned()].into_iter())
            .expect("parse options");
        assert_eq!(options.config_path.as_deref(), Some("modal.json"));
        assert!(!options.multi);
    }

    #[test]
    fn parses_delay_and_drop() {
        let options = parse_options(
            [
                "--delay-ms".to_owned(),
                "50".to_owned(),
                "--drop".to_owned(),
                "advanced-doc".to_owned(),
            ]
            .into_iter(),
        )
        .expect("parse options");
        assert_eq!(options.delay_ms, Some(50));
        assert_eq!(options.drop_document.as_deref(), Some("advanced-doc"));
    }

    #[test]
    fn rejects_multi_with_config() {
        parse_options(
            ["--multi".to_owned(), "--config".to_owned(), "modal.json".to_owned()].into_iter(),
        )
        .unwrap_err();
    }

    #[test]
    fn rejects_unknown_args() {
        parse_options(["--nope".to_owned()].into_iter()).unwrap_err();
    }

    #[test]
    fn rejects_duplicate_flags() {
        parse_options(["--multi".to_owned(), "--multi".to_owned()].into_iter()).unwrap_err();

        parse_options(
            [
                "--delay-ms".to_owned(),
                "10".to_owned(),
                "--delay-ms".to_owned(),
                "20".to_owned(),
            ]
            .into_iter(),
        )
        .unwrap_err();
    }

    #[test]
    fn rejects_missing_values() {
        parse_options(["--config".to_owned()].into_iter()).unwrap_err();
        parse_options(["--delay-ms".to_owned()].into_iter()).unwrap_err();
        parse_options(["--drop".to_owned()].into_iter()).unwrap_err();
    }
}
