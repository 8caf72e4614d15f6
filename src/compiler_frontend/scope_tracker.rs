//! Scope Tracker
//!
//! One frame per function nesting level, holding the names already bound in that frame.
//! The lowering engine asks the tracker whether an assignment to a plain name
//! needs a fresh local declaration or is a re-assignment of an existing binding.
//!
//! The module level is an ordinary frame that starts empty, exactly like a function
//! body with no parameters.

use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::return_compiler_error;
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// First binding of the name in the current frame.
    Declare,
    Reassign,
}

impl Binding {
    /// Text placed in front of the assignment.
    pub fn prefix(self) -> &'static str {
        match self {
            Binding::Declare => "var ",
            Binding::Reassign => "",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScopeTracker {
    frames: Vec<FxHashSet<String>>,
}

impl Default for ScopeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTracker {
    pub fn new() -> Self {
        ScopeTracker {
            frames: vec![FxHashSet::default()],
        }
    }

    /// Pushes a frame seeded with the function's parameter names.
    pub fn enter_function<'a>(&mut self, params: impl IntoIterator<Item = &'a str>) {
        let frame = params.into_iter().map(str::to_owned).collect();
        self.frames.push(frame);
    }

    pub fn exit_function(&mut self) -> Result<(), CompilerError> {
        if self.frames.len() <= 1 {
            return_compiler_error!("Scope tracker tried to leave the module frame");
        }

        self.frames.pop();
        Ok(())
    }

    /// Records a binding of `name` in the current frame.
    /// Only the first binding of a name in a frame is a declaration.
    pub fn bind(&mut self, name: &str) -> Binding {
        let frame = self.current_frame_mut();

        if frame.contains(name) {
            Binding::Reassign
        } else {
            frame.insert(name.to_owned());
            Binding::Declare
        }
    }

    /// Marks names as bound without declaring them,
    /// so later assignments reach the outer binding.
    pub fn declare_global<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        let frame = self.current_frame_mut();
        for name in names {
            frame.insert(name.to_owned());
        }
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.frames
            .last()
            .is_some_and(|frame| frame.contains(name))
    }

    /// Whether any open frame, the module frame included, binds `name`.
    pub fn is_visible(&self, name: &str) -> bool {
        self.frames.iter().any(|frame| frame.contains(name))
    }

    /// Number of open frames, including the module frame.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    fn current_frame_mut(&mut self) -> &mut FxHashSet<String> {
        if self.frames.is_empty() {
            self.frames.push(FxHashSet::default());
        }

        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }
}
