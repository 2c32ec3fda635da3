mod convert;
pub use convert::ConvertApp;

mod export_labels;
pub use export_labels::ExportLabelsApp;

mod validate;
pub use validate::ValidateApp;
