//! PDF rendering of composed documents.

mod printpdf_renderer;

pub use printpdf_renderer::PrintPdfRenderer;
