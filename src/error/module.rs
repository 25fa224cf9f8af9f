use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    #[error("module does not exist")]
    Unknown(String),

    #[error("module is already loaded")]
    AlreadyInstalled(String),

    #[error("module is not loaded")]
    NotInstalled(String),

    /// The core module carries module management itself and stays installed.
    #[error("This module cannot be unloaded.")]
    Protected(String),
}

impl ModuleError {
    /// Name of the module the error refers to.
    pub fn module(&self) -> &str {
        match self {
            Self::Unknown(name)
            | Self::AlreadyInstalled(name)
            | Self::NotInstalled(name)
            | Self::Protected(name) => name,
        }
    }
}
