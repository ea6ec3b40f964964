//! Retrieve command

use crate::app::{OutputFormat, RetrieveArgs};
use anyhow::Result;
use ragbridge_core::{OutgoingRequest, ProviderRegistry, RagConfig, RequestPipeline};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct RetrieveOutput<'a> {
    question: &'a str,
    queries: Vec<&'a str>,
    contents: &'a [String],
    content_block: &'a str,
}

pub async fn run(
    args: RetrieveArgs,
    config: RagConfig,
    registry: &ProviderRegistry,
    format: OutputFormat,
) -> Result<()> {
    let question = args.question.join(" ");
    let pipeline = RequestPipeline::new(Arc::new(config))?;

    let request = OutgoingRequest::new(question.as_str());
    let (rewritten, result) = pipeline.retrieve_for(&request, registry).await;
    let block = pipeline.content_block(&result);

    match format {
        OutputFormat::Json => {
            let output = RetrieveOutput {
                question: &question,
                queries: rewritten.queries(),
                contents: &result.contents,
                content_block: &block,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Cli => {
            if !rewritten.is_unchanged(&question) {
                println!("Rewritten query: {}", rewritten.queries().join(" | "));
                println!();
            }
            if block.is_empty() {
                println!("No relevant content found.");
            } else {
                println!("{}", block);
            }
        }
    }
    Ok(())
}
