use crate::cancel::CancelSignal;
use async_trait::async_trait;
use dom::xml::{XmlParseError, XmlParserOptions, XmlTokenizer, XmlTreeBuilder};
use dom::Document;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseStatus {
    /// The whole source was consumed.
    Finished,
    /// Stopped early because cancellation was requested; the tree holds
    /// whatever was built so far.
    Interrupted,
}

/// Fills an attached document's tree from its text source.
#[async_trait]
pub trait DocumentParser: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn parse(
        &self,
        document: &mut Document,
        options: XmlParserOptions,
        cancel: &CancelSignal,
    ) -> Result<ParseStatus, Self::Error>;
}

/// Drives [`XmlTokenizer`] and [`XmlTreeBuilder`] over the document source,
/// yielding to the runtime every `yield_interval` tokens and checking the
/// cancel signal before each token.
///
/// The source text is leased from the document while parsing rather than
/// copied; it is back in place when `parse` returns.
#[derive(Clone, Copy, Debug, Default)]
pub struct XmlDomBuilder;

#[async_trait]
impl DocumentParser for XmlDomBuilder {
    type Error = XmlParseError;

    async fn parse(
        &self,
        document: &mut Document,
        options: XmlParserOptions,
        cancel: &CancelSignal,
    ) -> Result<ParseStatus, XmlParseError> {
        let interval = options.yield_interval.max(1);
        let mut lease = document.lease_source();
        let (document, text) = lease.split();
        let mut tokenizer = XmlTokenizer::new(text).with_fold_case(options.fold_case);
        let mut builder = XmlTreeBuilder::new(options);
        let mut tokens = 0usize;

        loop {
            if cancel.is_cancelled() {
                log::debug!(
                    target: "runtime_parse.xml",
                    "interrupted at {} after {tokens} tokens",
                    tokenizer.position()
                );
                return Ok(ParseStatus::Interrupted);
            }
            let Some(token) = tokenizer.next_token()? else {
                break;
            };
            builder.push_token(document, token)?;
            tokens += 1;
            if tokens % interval == 0 {
                tokio::task::yield_now().await;
            }
        }

        builder.finish()?;
        log::trace!(target: "runtime_parse.xml", "parsed {tokens} tokens");
        Ok(ParseStatus::Finished)
    }
}
