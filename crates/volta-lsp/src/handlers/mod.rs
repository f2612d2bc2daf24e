pub mod completion;
pub mod definition;
pub mod diagnostics;
pub mod hover;
pub mod signature_help;
