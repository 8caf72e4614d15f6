//! Class Linearizer
//!
//! Keeps a registry of every class definition seen so far in a compilation unit and
//! computes each class's method resolution order with the C3 merge:
//!
//! `order(C) = [C] ++ merge(order(B1), ..., order(Bn), [B1, ..., Bn])`
//!
//! Inherited members are then flattened onto the derived class at compile time,
//! so the generated code never walks a base chain at run time.

use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::{mro_log, return_compiler_error};
use rustc_hash::{FxHashMap, FxHashSet};

/// The universal root base. It terminates every order and owns no members.
pub const ROOT_CLASS: &str = "object";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Method { is_static: bool },
    Attribute,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMember {
    pub name: String,
    pub kind: MemberKind,
}

impl ClassMember {
    pub fn method(name: impl Into<String>, is_static: bool) -> Self {
        ClassMember {
            name: name.into(),
            kind: MemberKind::Method { is_static },
        }
    }

    pub fn attribute(name: impl Into<String>) -> Self {
        ClassMember {
            name: name.into(),
            kind: MemberKind::Attribute,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRecord {
    pub name: String,
    pub bases: Vec<String>,

    // Members defined directly in the class body, in body order
    pub members: Vec<ClassMember>,
}

/// A member bound onto a derived class by reference to the ancestor that defines it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InheritedMember {
    pub name: String,
    pub owner: String,
    pub kind: MemberKind,
}

#[derive(Debug, Clone)]
pub struct ClassRegistry {
    classes: FxHashMap<String, ClassRecord>,
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassRegistry {
    pub fn new() -> Self {
        let mut classes = FxHashMap::default();
        classes.insert(
            ROOT_CLASS.to_owned(),
            ClassRecord {
                name: ROOT_CLASS.to_owned(),
                bases: Vec::new(),
                members: Vec::new(),
            },
        );

        ClassRegistry { classes }
    }

    /// Adds a class definition. Every base must already be registered.
    /// A class without bases derives from the root.
    pub fn register(&mut self, mut record: ClassRecord) -> Result<(), CompilerError> {
        if record.bases.is_empty() && record.name != ROOT_CLASS {
            record.bases.push(ROOT_CLASS.to_owned());
        }

        for base in &record.bases {
            if !self.classes.contains_key(base) {
                return Err(CompilerError::undefined_base(&record.name, base));
            }
        }

        mro_log!("Registered class ", Bright record.name, " with bases ", #record.bases);

        self.classes.insert(record.name.to_owned(), record);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ClassRecord> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn linearize(&self, name: &str) -> Result<Vec<String>, CompilerError> {
        let mut visiting = FxHashSet::default();
        let order = self.linearize_class(name, &mut visiting)?;

        mro_log!("MRO of ", Bright name, ": ", #order);

        Ok(order)
    }

    /// Members reachable through the ancestors of `name` that the class does not define itself.
    /// Walks the resolution order from the first proper ancestor outward, skipping the root;
    /// the first ancestor to define a name wins.
    pub fn inherited_members(&self, name: &str) -> Result<Vec<InheritedMember>, CompilerError> {
        let order = self.linearize(name)?;

        let Some(record) = self.classes.get(name) else {
            return_compiler_error!(format!(
                "Class '{}' was linearized without being registered",
                name
            ));
        };

        let mut seen: FxHashSet<&str> = record
            .members
            .iter()
            .map(|member| member.name.as_str())
            .collect();

        let mut inherited = Vec::new();
        for ancestor in order.iter().skip(1) {
            if ancestor == ROOT_CLASS {
                continue;
            }

            let Some(ancestor_record) = self.classes.get(ancestor) else {
                return_compiler_error!(format!(
                    "Ancestor '{}' of '{}' is missing from the class registry",
                    ancestor, name
                ));
            };

            for member in &ancestor_record.members {
                if seen.insert(member.name.as_str()) {
                    inherited.push(InheritedMember {
                        name: member.name.to_owned(),
                        owner: ancestor.to_owned(),
                        kind: member.kind,
                    });
                }
            }
        }

        Ok(inherited)
    }

    fn linearize_class(
        &self,
        name: &str,
        visiting: &mut FxHashSet<String>,
    ) -> Result<Vec<String>, CompilerError> {
        let Some(record) = self.classes.get(name) else {
            return_compiler_error!(format!("Class '{}' is not in the class registry", name));
        };

        // A class redefined on top of itself would recurse forever
        if !visiting.insert(name.to_owned()) {
            return Err(CompilerError::linearization(name, vec![name.to_owned()]));
        }

        let mut lists = Vec::with_capacity(record.bases.len() + 1);
        for base in &record.bases {
            lists.push(self.linearize_class(base, visiting)?);
        }
        lists.push(record.bases.to_owned());

        visiting.remove(name);

        let mut order = vec![name.to_owned()];
        order.extend(merge(name, lists)?);
        Ok(order)
    }
}

fn merge(class_name: &str, mut lists: Vec<Vec<String>>) -> Result<Vec<String>, CompilerError> {
    let mut merged = Vec::new();

    loop {
        lists.retain(|list| !list.is_empty());
        if lists.is_empty() {
            return Ok(merged);
        }

        let eligible = lists
            .iter()
            .map(|list| &list[0])
            .find(|head| !appears_in_any_tail(&lists, head))
            .cloned();

        let Some(head) = eligible else {
            return Err(CompilerError::linearization(class_name, blocking_cycle(&lists)));
        };

        for list in lists.iter_mut() {
            if list[0] == head {
                list.remove(0);
            }
        }
        merged.push(head);
    }
}

fn appears_in_any_tail(lists: &[Vec<String>], candidate: &str) -> bool {
    lists
        .iter()
        .any(|list| list[1..].iter().any(|name| name == candidate))
}

/// Follows each blocked head to the head of the list blocking it until a class repeats.
/// The result starts at the repeated class.
fn blocking_cycle(lists: &[Vec<String>]) -> Vec<String> {
    let Some(mut candidate) = lists.first().and_then(|list| list.first()).cloned() else {
        return Vec::new();
    };

    let mut trail: Vec<String> = Vec::new();
    loop {
        if let Some(start) = trail.iter().position(|name| *name == candidate) {
            return trail.split_off(start);
        }

        let blocker = lists
            .iter()
            .find(|list| list[1..].iter().any(|name| *name == candidate));

        trail.push(candidate);

        match blocker {
            Some(list) => candidate = list[0].to_owned(),
            None => return trail,
        }
    }
}
