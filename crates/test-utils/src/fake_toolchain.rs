use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use sitepipe::compile::toolchain::{Invocation, ToolFailure, Toolchain};

/// A toolchain that never spawns anything.
///
/// - `--output=<path>` / `--outFile <path>`: writes the concatenation of
///   every input file argument to `<path>`.
/// - otherwise: returns the content of the input files as stdout.
///
/// Every invocation is recorded. Invocations mentioning a "poisoned"
/// substring fail with exit code 1.
#[derive(Debug, Clone, Default)]
pub struct FakeToolchain {
    invocations: Arc<Mutex<Vec<Invocation>>>,
    fail_on: Arc<Mutex<Vec<String>>>,
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every invocation whose arguments contain `needle`.
    pub fn fail_on(&self, needle: &str) {
        self.fail_on.lock().unwrap().push(needle.to_string());
    }

    pub fn clear_failures(&self) {
        self.fail_on.lock().unwrap().clear();
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// Number of invocations whose program is `program`.
    pub fn count(&self, program: &str) -> usize {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.program == program)
            .count()
    }
}

impl Toolchain for FakeToolchain {
    fn invoke(&self, invocation: &Invocation) -> Result<Vec<u8>, ToolFailure> {
        self.invocations.lock().unwrap().push(invocation.clone());

        let poisoned = self.fail_on.lock().unwrap().iter().any(|needle| {
            invocation.args.iter().any(|a| a.contains(needle.as_str()))
        });
        if poisoned {
            return Err(ToolFailure::Exit {
                code: Some(1),
                stderr: format!("fake compile error in {}", invocation.args.join(" ")),
            });
        }

        let mut output: Option<PathBuf> = None;
        let mut inputs: Vec<PathBuf> = Vec::new();
        let mut args = invocation.args.iter();
        while let Some(arg) = args.next() {
            if let Some(path) = arg.strip_prefix("--output=") {
                output = Some(PathBuf::from(path));
            } else if arg == "--outFile" {
                output = args.next().map(PathBuf::from);
            } else if Path::new(arg).is_file() {
                inputs.push(PathBuf::from(arg));
            }
        }

        let mut content = Vec::new();
        for input in &inputs {
            let bytes = std::fs::read(input).map_err(|e| ToolFailure::Spawn(e.to_string()))?;
            content.extend_from_slice(&bytes);
        }

        match output {
            Some(path) => {
                std::fs::write(&path, &content).map_err(|e| ToolFailure::Spawn(e.to_string()))?;
                Ok(Vec::new())
            }
            None => Ok(content),
        }
    }
}
