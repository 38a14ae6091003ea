pub mod path;
pub mod query;
pub mod validated;

pub trait Extractor {
    type Extracted;

    fn extracted(&self) -> &Self::Extracted;

    fn into_extracted(self) -> Self::Extracted;
}
