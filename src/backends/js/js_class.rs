//! Class definitions lower to a factory function plus a private prototype-carrying
//! implementation type. Inheritance is flattened at compile time: every member an
//! ancestor defines and the class does not is bound onto the class by reference.

use crate::backends::js::js_emission::JsLines;
use crate::backends::js::js_expr::escape_js_string;
use crate::backends::js::js_function::read_decorators;
use crate::backends::js::{Enclosing, JsEmitter, LoweringContext, declared_identifier};
use crate::codegen_log;
use crate::compiler_frontend::class_linearizer::{
    ClassMember, ClassRecord, InheritedMember, MemberKind,
};
use crate::compiler_frontend::compiler_errors::{CompilerError, ErrorMetaDataKey};
use crate::compiler_frontend::ir::ir_nodes::Node;
use crate::compiler_frontend::ir::ir_schema::NodeKind;
use crate::return_unsupported_error;

const INITIALIZER: &str = "__init__";

/// Name of the private type whose prototype carries a class's members.
pub(crate) fn implementation_name(class_name: &str) -> String {
    format!("_{}", declared_identifier(class_name))
}

impl<'a> JsEmitter<'a> {
    pub(crate) fn lower_class_def(
        &self,
        context: &mut LoweringContext,
        definition: &Node,
    ) -> Result<JsLines, CompilerError> {
        let name = definition.str("name")?;

        if !definition.list("decorators")?.is_empty() {
            return_unsupported_error!(NodeKind::ClassDef, "class decorators are not supported");
        }

        let mut bases = Vec::new();
        for base in definition.list("bases")? {
            if base.kind() != NodeKind::Name {
                return_unsupported_error!(
                    NodeKind::ClassDef,
                    "class bases must be plain names",
                    base.position()
                );
            }
            bases.push(base.str("id")?.to_owned());
        }

        let body = definition.list("body")?;
        let members = collect_members(name, body)?;

        let (order, inherited) = register_and_linearize(context, name, bases, members.clone())
            .map_err(|error| error.with_metadata(ErrorMetaDataKey::ClassName, name))?;

        codegen_log!(Blue "Lowering class {} with order {:?}", name, order);
        context.class_orders.push((name.to_owned(), order));
        context.scopes.bind(name);

        let class = declared_identifier(name);
        let implementation = implementation_name(name);
        let enclosing = Enclosing::class(name);

        // (a) factory
        let mut factory = JsLines::single(format!("var __inst = new {}();", implementation));
        factory.line(format!(
            "{}.prototype.{}.apply(__inst, arguments);",
            implementation, INITIALIZER
        ));
        factory.line("return __inst;");

        let mut lines = JsLines::single(format!("function {}() {{", class));
        lines.nested(factory);
        lines.line("}");

        // (b) implementation type, (c) name tag and back-reference
        lines.line(format!("function {}() {{", implementation));
        lines.line("}");
        lines.line(format!(
            "{}.__name__ = {};",
            implementation,
            escape_js_string(name)
        ));
        lines.line(format!(
            "{}.prototype.__class__ = {};",
            implementation, implementation
        ));

        // (d) class-level assignments and expression statements
        for statement in body {
            match statement.kind() {
                NodeKind::Assign => {
                    // a = b = value evaluates value once, each later target reads the one before
                    let mut value = self.lower_expr(context, enclosing, statement.node("value")?)?;
                    for target in statement.list("targets")? {
                        let attribute = target.str("id")?;
                        lines.line(format!("{}.{} = {};", class, attribute, value));
                        lines.line(format!(
                            "{}.prototype.{} = {}.{};",
                            implementation, attribute, class, attribute
                        ));
                        value = format!("{}.{}", class, attribute);
                    }
                }

                NodeKind::Expr => {
                    if !is_docstring(statement)? {
                        lines.extend(self.lower_statement(context, enclosing, statement)?);
                    }
                }

                _ => {}
            }
        }

        // (e) methods
        for statement in body {
            if statement.kind() == NodeKind::FunctionDef {
                lines.extend(self.lower_statement(context, enclosing, statement)?);
            }
        }

        // (f) the factory always calls the initializer, so one must exist
        let has_initializer = members.iter().any(|member| member.name == INITIALIZER)
            || inherited.iter().any(|member| member.name == INITIALIZER);
        if !has_initializer {
            lines.line(format!(
                "{}.prototype.{} = function() {{",
                implementation, INITIALIZER
            ));
            lines.line("};");
        }

        // (g) inherited bindings
        for member in &inherited {
            lines.extend(inherited_binding(&class, &implementation, member));
        }

        Ok(lines)
    }
}

fn register_and_linearize(
    context: &mut LoweringContext,
    name: &str,
    bases: Vec<String>,
    members: Vec<ClassMember>,
) -> Result<(Vec<String>, Vec<InheritedMember>), CompilerError> {
    context.classes.register(ClassRecord {
        name: name.to_owned(),
        bases,
        members,
    })?;

    let order = context.classes.linearize(name)?;
    let inherited = context.classes.inherited_members(name)?;
    Ok((order, inherited))
}

/// Own members of a class body, in body order. Rejects anything a class body may not hold.
fn collect_members(class_name: &str, body: &[Node]) -> Result<Vec<ClassMember>, CompilerError> {
    let mut members = Vec::new();

    for statement in body {
        match statement.kind() {
            NodeKind::FunctionDef => {
                let is_static = read_decorators(statement, Enclosing::class(class_name))?;
                members.push(ClassMember::method(statement.str("name")?, is_static));
            }

            NodeKind::Assign => {
                for target in statement.list("targets")? {
                    if target.kind() != NodeKind::Name {
                        return_unsupported_error!(
                            NodeKind::ClassDef,
                            "class-level assignments must bind plain names",
                            target.position()
                        );
                    }
                    members.push(ClassMember::attribute(target.str("id")?));
                }
            }

            NodeKind::Expr | NodeKind::Pass => {}

            NodeKind::ClassDef => return_unsupported_error!(
                NodeKind::ClassDef,
                "nested classes are not supported",
                statement.position()
            ),

            other => return_unsupported_error!(
                other,
                "not allowed directly inside a class body",
                statement.position()
            ),
        }
    }

    Ok(members)
}

fn is_docstring(statement: &Node) -> Result<bool, CompilerError> {
    Ok(statement.node("value")?.kind() == NodeKind::Str)
}

fn inherited_binding(class: &str, implementation: &str, member: &InheritedMember) -> JsLines {
    let name = &member.name;

    match member.kind {
        MemberKind::Method { is_static } => {
            let mut lines = JsLines::single(format!(
                "{}.prototype.{} = {}.prototype.{};",
                implementation,
                name,
                implementation_name(&member.owner),
                name
            ));
            if is_static {
                lines.line(format!(
                    "{}.{} = {}.prototype.{};",
                    class, name, implementation, name
                ));
            }
            lines
        }

        MemberKind::Attribute => {
            let owner = declared_identifier(&member.owner);
            let mut lines = JsLines::single(format!("{}.{} = {}.{};", class, name, owner, name));
            lines.line(format!(
                "{}.prototype.{} = {}.{};",
                implementation, name, owner, name
            ));
            lines
        }
    }
}
