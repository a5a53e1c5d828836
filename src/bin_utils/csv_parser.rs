use std::io::Read;

use crate::command::RequestKind;
use csv::{DeserializeRecordsIntoIter, Trim};
use serde::Deserialize;

/// One request row. `id` is the account the request acts on (the source
/// account for transfers), `to` is only used by transfers.
#[derive(Debug, Deserialize)]
pub struct Request {
    #[serde(rename = "type")]
    pub kind: RequestKind,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
}

impl Request {
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    pub fn to(&self) -> &str {
        self.to.as_deref().unwrap_or_default()
    }

    pub fn amount(&self) -> &str {
        self.amount.as_deref().unwrap_or_default()
    }
}

/// Parses request list in CSV format, yielding each row with its line number.
pub struct CsvRequestParser<R> {
    iter: DeserializeRecordsIntoIter<R, Request>,
}

impl<R> CsvRequestParser<R>
where
    R: Read,
{
    /// Reads the header row up front, so reported line numbers start at 2.
    pub fn new(source: R) -> csv::Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);
        reader.headers()?;

        Ok(Self {
            iter: reader.into_deserialize(),
        })
    }
}

impl<R> Iterator for CsvRequestParser<R>
where
    R: Read,
{
    type Item = (u64, csv::Result<Request>);

    fn next(&mut self) -> Option<Self::Item> {
        let curr_line = self.iter.reader().position().line();
        self.iter.next().map(|row| (curr_line, row))
    }
}
