// src/types.rs

use std::fmt;

/// One of the four source categories that each compile into one artifact.
///
/// The declaration order is the injection order into the site template:
/// UI module, dependencies, typed scripts, stylesheets. `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetClass {
    UiModule,
    Dependencies,
    TypedScript,
    Stylesheet,
}

impl AssetClass {
    /// All asset classes, in injection order.
    pub const ALL: [AssetClass; 4] = [
        AssetClass::UiModule,
        AssetClass::Dependencies,
        AssetClass::TypedScript,
        AssetClass::Stylesheet,
    ];

    /// Stable, human-readable tag used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            AssetClass::UiModule => "ui-module",
            AssetClass::Dependencies => "dependencies",
            AssetClass::TypedScript => "typed-script",
            AssetClass::Stylesheet => "stylesheet",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a build task: one per asset class plus the HTML injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskId {
    Asset(AssetClass),
    Html,
}

impl TaskId {
    /// All tasks; the four asset tasks first, the HTML task last.
    pub const ALL: [TaskId; 5] = [
        TaskId::Asset(AssetClass::UiModule),
        TaskId::Asset(AssetClass::Dependencies),
        TaskId::Asset(AssetClass::TypedScript),
        TaskId::Asset(AssetClass::Stylesheet),
        TaskId::Html,
    ];

    /// The command name that runs this task on its own.
    pub fn command_name(self) -> &'static str {
        match self {
            TaskId::Asset(AssetClass::UiModule) => "compile-ui-module",
            TaskId::Asset(AssetClass::Dependencies) => "concatenate-dependencies",
            TaskId::Asset(AssetClass::TypedScript) => "compile-typed-script",
            TaskId::Asset(AssetClass::Stylesheet) => "compile-stylesheets",
            TaskId::Html => "inject-html",
        }
    }

    pub fn asset_class(self) -> Option<AssetClass> {
        match self {
            TaskId::Asset(class) => Some(class),
            TaskId::Html => None,
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command_name())
    }
}
