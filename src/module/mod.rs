//! Command modules.
//!
//! A module is a named group of commands and event listeners. Modules are installed into a
//! `Registry` owned by the bot and can be loaded, unloaded and reloaded at runtime. Every
//! command and listener a module adds is tagged with the module's name so uninstalling
//! removes exactly what installing added.

pub mod admin;
pub mod emoji;
pub mod logging;
pub mod other;
pub mod roles;
pub mod root;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    bot::Bot,
    command::Command,
    error::module::ModuleError,
    model::event::Dispatched,
};

/// Receives events after their counters have been committed.
#[async_trait]
pub trait Listener: Send + Sync {
    async fn on_event(&self, bot: &Bot, event: &Dispatched);
}

pub trait Module: Send + Sync {
    fn name(&self) -> &'static str;

    /// Modules that refuse to be unloaded. Reloading is still allowed.
    fn protected(&self) -> bool {
        false
    }

    fn install(&self, registry: &mut Registry);

    fn uninstall(&self, registry: &mut Registry) {
        registry.remove_tagged(self.name());
    }
}

/// Every module the bot knows about, in load order.
pub fn catalog() -> Vec<Arc<dyn Module>> {
    vec![
        Arc::new(root::RootModule),
        Arc::new(admin::AdminModule),
        Arc::new(roles::RolesModule),
        Arc::new(emoji::EmojiModule),
        Arc::new(other::OtherModule),
        Arc::new(logging::LoggingModule),
    ]
}

pub struct Registry {
    catalog: Vec<Arc<dyn Module>>,
    installed: Vec<&'static str>,
    commands: Vec<(&'static str, Arc<dyn Command>)>,
    listeners: Vec<(&'static str, Arc<dyn Listener>)>,
}

impl Registry {
    pub fn new(catalog: Vec<Arc<dyn Module>>) -> Self {
        Self {
            catalog,
            installed: Vec::new(),
            commands: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Names of every module in the catalog.
    pub fn available(&self) -> Vec<&'static str> {
        self.catalog.iter().map(|module| module.name()).collect()
    }

    pub fn installed(&self) -> &[&'static str] {
        &self.installed
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.installed.contains(&name)
    }

    pub fn add_command(&mut self, module: &'static str, command: Arc<dyn Command>) {
        self.commands.push((module, command));
    }

    pub fn add_listener(&mut self, module: &'static str, listener: Arc<dyn Listener>) {
        self.listeners.push((module, listener));
    }

    /// Drops every command and listener tagged with `module`.
    pub fn remove_tagged(&mut self, module: &str) {
        self.commands.retain(|(tag, _)| *tag != module);
        self.listeners.retain(|(tag, _)| *tag != module);
    }

    fn module(&self, name: &str) -> Result<Arc<dyn Module>, ModuleError> {
        self.catalog
            .iter()
            .find(|module| module.name() == name)
            .cloned()
            .ok_or_else(|| ModuleError::Unknown(name.to_string()))
    }

    pub fn load(&mut self, name: &str) -> Result<(), ModuleError> {
        let module = self.module(name)?;
        if self.is_installed(module.name()) {
            return Err(ModuleError::AlreadyInstalled(name.to_string()));
        }

        module.install(self);
        self.installed.push(module.name());

        tracing::info!("Loaded module {}", module.name());

        Ok(())
    }

    pub fn unload(&mut self, name: &str) -> Result<(), ModuleError> {
        let module = self.module(name)?;
        if module.protected() {
            return Err(ModuleError::Protected(name.to_string()));
        }

        self.uninstall(module)
    }

    /// Uninstalls and installs a module again, protected ones included.
    pub fn reload(&mut self, name: &str) -> Result<(), ModuleError> {
        let module = self.module(name)?;
        self.uninstall(module)?;
        self.load(name)
    }

    fn uninstall(&mut self, module: Arc<dyn Module>) -> Result<(), ModuleError> {
        if !self.is_installed(module.name()) {
            return Err(ModuleError::NotInstalled(module.name().to_string()));
        }

        module.uninstall(self);
        self.installed.retain(|name| *name != module.name());

        tracing::info!("Unloaded module {}", module.name());

        Ok(())
    }

    /// Finds an installed command by name or alias.
    pub fn command(&self, name: &str, case_insensitive: bool) -> Option<Arc<dyn Command>> {
        let matches = |candidate: &str| {
            if case_insensitive {
                candidate.eq_ignore_ascii_case(name)
            } else {
                candidate == name
            }
        };

        self.commands
            .iter()
            .find(|(_, command)| {
                matches(command.name()) || command.aliases().iter().any(|alias| matches(alias))
            })
            .map(|(_, command)| command.clone())
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn listeners(&self) -> Vec<Arc<dyn Listener>> {
        self.listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        let mut registry = Registry::new(catalog());
        for name in registry.available() {
            registry.load(name).unwrap();
        }
        registry
    }

    #[test]
    fn installs_the_whole_catalog() {
        let registry = registry();

        assert_eq!(registry.installed().len(), catalog().len());
        assert!(registry.command("warn", false).is_some());
        assert!(registry.command("ping", false).is_some());
        assert_eq!(registry.listeners().len(), 1);
    }

    #[test]
    fn unload_removes_only_the_module_commands() {
        let mut registry = registry();

        registry.unload("admin").unwrap();

        assert!(registry.command("warn", false).is_none());
        assert!(registry.command("ping", false).is_some());
        assert!(!registry.is_installed("admin"));

        registry.load("admin").unwrap();
        assert!(registry.command("warn", false).is_some());
    }

    #[test]
    fn rejects_unloading_the_root_module() {
        let mut registry = registry();

        assert_eq!(
            registry.unload("root"),
            Err(ModuleError::Protected("root".to_string()))
        );
        assert!(registry.command("module", false).is_some());
    }

    #[test]
    fn reloads_the_root_module() {
        let mut registry = registry();
        let before = registry.command_count();

        registry.reload("root").unwrap();

        assert_eq!(registry.command_count(), before);
        assert!(registry.is_installed("root"));
    }

    #[test]
    fn reports_unknown_and_duplicate_modules() {
        let mut registry = registry();

        assert_eq!(
            registry.load("music"),
            Err(ModuleError::Unknown("music".to_string()))
        );
        assert_eq!(
            registry.load("other"),
            Err(ModuleError::AlreadyInstalled("other".to_string()))
        );

        registry.unload("other").unwrap();
        assert_eq!(
            registry.unload("other"),
            Err(ModuleError::NotInstalled("other".to_string()))
        );
    }

    #[test]
    fn matches_case_insensitively_when_configured() {
        let registry = registry();

        assert!(registry.command("PING", false).is_none());
        assert!(registry.command("PING", true).is_some());
    }
}
