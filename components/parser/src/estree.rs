//! Projection of the AST to the ESTree JSON shape.
//!
//! Every non-temporal node maps deterministically to a JSON object with a
//! `type` tag and the conventional ESTree fields, with a stable key order
//! per node type. Parenthesised expressions are erased. Temporal
//! cover-grammar nodes never reach this module; the parser rejects any
//! residue before a tree escapes.

use serde_json::{json, Value};

use crate::ast::*;

/// An identifier node for a name, or JSON null for the empty name.
fn ident(name: &str) -> Value {
    if name.is_empty() {
        return Value::Null;
    }
    json!({ "type": "Identifier", "name": name })
}

/// An identifier node for an optional name.
fn opt_ident(name: &Option<String>) -> Value {
    match name {
        Some(name) => ident(name),
        None => Value::Null,
    }
}

fn opt_expr(e: &Option<Expression>) -> Value {
    match e {
        Some(e) => e.estree(),
        None => Value::Null,
    }
}

fn rest_element(argument: Value) -> Value {
    json!({ "type": "RestElement", "argument": argument })
}

impl Program {
    /// The ESTree representation of the parse root.
    pub fn estree(&self) -> Value {
        match self {
            Program::Script { body, .. } => json!({
                "type": "Program",
                "body": body.iter().map(Statement::estree).collect::<Vec<_>>(),
                "sourceType": "script",
            }),
            Program::Module { body, .. } => json!({
                "type": "Program",
                "body": body.iter().map(Statement::estree).collect::<Vec<_>>(),
                "sourceType": "module",
            }),
            Program::Expression(e) => e.estree(),
        }
    }
}

impl Statement {
    /// The ESTree representation of the statement.
    pub fn estree(&self) -> Value {
        match self {
            Statement::Block(n) => n.estree(),
            Statement::Empty { .. } => json!({ "type": "EmptyStatement" }),
            Statement::Expression(n) => n.estree(),
            Statement::Variable(n) => n.estree(),
            Statement::If { test, consequent, alternate, .. } => json!({
                "type": "IfStatement",
                "test": test.estree(),
                "consequent": consequent.estree(),
                "alternate": alternate.as_ref().map(|s| s.estree()).unwrap_or(Value::Null),
            }),
            Statement::While { test, body, .. } => json!({
                "type": "WhileStatement",
                "test": test.estree(),
                "body": body.estree(),
            }),
            Statement::DoWhile { body, test, .. } => json!({
                "type": "DoWhileStatement",
                "test": test.estree(),
                "body": body.estree(),
            }),
            Statement::For { init, test, update, body, .. } => json!({
                "type": "ForStatement",
                "init": init.as_ref().map(ForHead::estree).unwrap_or(Value::Null),
                "test": opt_expr(test),
                "update": opt_expr(update),
                "body": body.estree(),
            }),
            Statement::ForIn { left, right, body, .. } => json!({
                "type": "ForInStatement",
                "each": false,
                "left": left.estree(),
                "right": right.estree(),
                "body": body.estree(),
            }),
            Statement::ForOf { left, right, body, .. } => json!({
                "type": "ForOfStatement",
                "left": left.estree(),
                "right": right.estree(),
                "body": body.estree(),
            }),
            Statement::Switch { discriminant, cases, .. } => json!({
                "type": "SwitchStatement",
                "discriminant": discriminant.estree(),
                "cases": cases.iter().map(SwitchCase::estree).collect::<Vec<_>>(),
            }),
            Statement::Continue { label, .. } => json!({
                "type": "ContinueStatement",
                "label": opt_ident(label),
            }),
            Statement::Break { label, .. } => json!({
                "type": "BreakStatement",
                "label": opt_ident(label),
            }),
            Statement::Return { argument, .. } => json!({
                "type": "ReturnStatement",
                "argument": opt_expr(argument),
            }),
            Statement::Throw { argument, .. } => json!({
                "type": "ThrowStatement",
                "argument": argument.estree(),
            }),
            Statement::Try { block, handler, finalizer, .. } => json!({
                "type": "TryStatement",
                "block": block.estree(),
                "handler": handler.as_ref().map(CatchClause::estree).unwrap_or(Value::Null),
                "finalizer": finalizer.as_ref().map(BlockStatement::estree).unwrap_or(Value::Null),
            }),
            Statement::Labeled { label, body, .. } => json!({
                "type": "LabeledStatement",
                "label": ident(label),
                "body": body.estree(),
            }),
            Statement::Function(n) => n.estree(),
            Statement::Class(n) => n.estree(),
            Statement::Import(n) => n.estree(),
        }
    }
}

impl BlockStatement {
    /// The ESTree representation of the block.
    pub fn estree(&self) -> Value {
        json!({
            "type": "BlockStatement",
            "body": self.body.iter().map(Statement::estree).collect::<Vec<_>>(),
        })
    }
}

impl ExpressionStatement {
    /// The ESTree representation of the expression statement.
    pub fn estree(&self) -> Value {
        let mut v = json!({
            "type": "ExpressionStatement",
            "expression": self.expression.estree(),
        });
        if let Some(directive) = &self.directive {
            v["directive"] = json!(directive);
        }
        v
    }
}

impl VariableDeclaration {
    /// The ESTree representation of the declaration.
    pub fn estree(&self) -> Value {
        json!({
            "type": "VariableDeclaration",
            "declarations": self.declarations.iter().map(VariableDeclarator::estree).collect::<Vec<_>>(),
            "kind": self.kind.as_str(),
        })
    }
}

impl VariableDeclarator {
    /// The ESTree representation of the declarator.
    pub fn estree(&self) -> Value {
        json!({
            "type": "VariableDeclarator",
            "id": self.id.estree(),
            "init": opt_expr(&self.init),
        })
    }
}

impl BindingPattern {
    /// The ESTree representation of the binding target.
    pub fn estree(&self) -> Value {
        match self {
            BindingPattern::Identifier(name) => ident(name),
            BindingPattern::Array(p) => p.estree(),
            BindingPattern::Object(p) => p.estree(),
        }
    }
}

impl ArrayBindingPattern {
    /// The ESTree representation of the pattern. A rest pattern appears as a
    /// trailing `RestElement`.
    pub fn estree(&self) -> Value {
        let mut elements: Vec<Value> = self
            .elements
            .iter()
            .map(|e| e.as_ref().map(BindingElement::estree).unwrap_or(Value::Null))
            .collect();
        if let Some(rest) = &self.rest {
            elements.push(rest_element(rest.estree()));
        }
        json!({ "type": "ArrayPattern", "elements": elements })
    }
}

impl ObjectBindingPattern {
    /// The ESTree representation of the pattern. A rest identifier appears
    /// as a trailing `RestElement` property.
    pub fn estree(&self) -> Value {
        let mut properties: Vec<Value> =
            self.properties.iter().map(BindingProperty::estree).collect();
        if let Some(rest) = &self.rest {
            properties.push(rest_element(ident(rest)));
        }
        json!({ "type": "ObjectPattern", "properties": properties })
    }
}

impl BindingElement {
    /// The ESTree representation of the element; a default wraps the target
    /// in an `AssignmentPattern`.
    pub fn estree(&self) -> Value {
        let e = self.pattern.estree();
        match &self.default {
            Some(default) => json!({
                "type": "AssignmentPattern",
                "left": e,
                "right": default.estree(),
            }),
            None => e,
        }
    }
}

impl BindingProperty {
    /// The ESTree representation of the property: a `Property` with
    /// `kind: "init"`, shorthand when the value is absent.
    pub fn estree(&self) -> Value {
        let key = ident(&self.name);
        let (mut value, shorthand) = match &self.value {
            Some(value) => (value.estree(), false),
            None => (key.clone(), true),
        };
        if let Some(default) = &self.default {
            value = json!({
                "type": "AssignmentPattern",
                "left": value,
                "right": default.estree(),
            });
        }
        json!({
            "type": "Property",
            "key": key,
            "computed": false,
            "value": value,
            "kind": "init",
            "method": false,
            "shorthand": shorthand,
        })
    }
}

impl FormalParameters {
    /// The ESTree representation: an array of patterns, with a trailing
    /// `RestElement` for the rest parameter.
    pub fn estree(&self) -> Value {
        let mut params: Vec<Value> = self.parameters.iter().map(BindingElement::estree).collect();
        if let Some(rest) = &self.rest {
            params.push(rest_element(ident(rest)));
        }
        Value::Array(params)
    }
}

impl ForHead {
    /// The ESTree representation of a for-statement head.
    pub fn estree(&self) -> Value {
        match self {
            ForHead::Variable(v) => v.estree(),
            ForHead::Expression(e) => e.estree(),
        }
    }
}

impl SwitchCase {
    /// The ESTree representation of the case.
    pub fn estree(&self) -> Value {
        json!({
            "type": "SwitchCase",
            "test": opt_expr(&self.test),
            "consequent": self.consequent.iter().map(Statement::estree).collect::<Vec<_>>(),
        })
    }
}

impl CatchClause {
    /// The ESTree representation of the clause.
    pub fn estree(&self) -> Value {
        json!({
            "type": "CatchClause",
            "param": self.param.as_ref().map(BindingPattern::estree).unwrap_or(Value::Null),
            "body": self.body.estree(),
        })
    }
}

impl FunctionDeclaration {
    /// The ESTree representation of the declaration.
    pub fn estree(&self) -> Value {
        json!({
            "type": "FunctionDeclaration",
            "id": ident(&self.id),
            "params": self.params.estree(),
            "body": self.body.estree(),
            "generator": self.is_generator,
            "expression": false,
            "async": self.is_async,
        })
    }
}

fn class_body(body: &[MethodDefinition]) -> Value {
    json!({
        "type": "ClassBody",
        "body": body.iter().map(MethodDefinition::estree).collect::<Vec<_>>(),
    })
}

impl ClassDeclaration {
    /// The ESTree representation of the declaration.
    pub fn estree(&self) -> Value {
        json!({
            "type": "ClassDeclaration",
            "id": ident(&self.id),
            "superClass": opt_expr(&self.super_class),
            "body": class_body(&self.body),
        })
    }
}

impl ClassExpression {
    /// The ESTree representation of the class expression.
    pub fn estree(&self) -> Value {
        json!({
            "type": "ClassExpression",
            "id": opt_ident(&self.id),
            "superClass": opt_expr(&self.super_class),
            "body": class_body(&self.body),
        })
    }
}

impl MethodDefinition {
    /// The ESTree representation of the method.
    pub fn estree(&self) -> Value {
        json!({
            "type": "MethodDefinition",
            "key": self.key.estree(),
            "value": self.value.estree(),
            "kind": self.kind.as_str(),
            "computed": self.computed,
            "static": self.is_static,
        })
    }
}

impl ImportDeclaration {
    /// The ESTree representation of the import declaration.
    pub fn estree(&self) -> Value {
        let mut specifiers = Vec::new();
        if let Some(default) = &self.default_binding {
            specifiers.push(json!({
                "type": "ImportDefaultSpecifier",
                "local": ident(default),
            }));
        }
        if let Some(namespace) = &self.namespace {
            specifiers.push(json!({
                "type": "ImportNamespaceSpecifier",
                "local": ident(namespace),
            }));
        }
        if let Some(named) = &self.named {
            for import in named {
                let local = import.binding.as_deref().unwrap_or(&import.name);
                specifiers.push(json!({
                    "type": "ImportSpecifier",
                    "imported": ident(&import.name),
                    "local": ident(local),
                }));
            }
        }
        json!({
            "type": "ImportDeclaration",
            "specifiers": specifiers,
            "source": { "type": "Literal", "value": self.module, "raw": self.module_raw },
        })
    }
}

impl FunctionExpression {
    /// The ESTree representation of the function or arrow expression.
    pub fn estree(&self) -> Value {
        let typ = if self.arrow {
            "ArrowFunctionExpression"
        } else {
            "FunctionExpression"
        };
        let (body, expression) = match &self.body {
            FunctionBody::Block(b) => (b.estree(), false),
            FunctionBody::Expression(e) => (e.estree(), true),
        };
        json!({
            "type": typ,
            "id": opt_ident(&self.id),
            "params": self.params.estree(),
            "body": body,
            "generator": self.is_generator,
            "expression": expression,
            "async": self.is_async,
        })
    }
}

impl Property {
    /// The ESTree representation of the property; shorthand properties copy
    /// the key into the value slot.
    pub fn estree(&self) -> Value {
        let key = self.key.estree();
        let (value, shorthand) = match &self.value {
            Some(value) => (value.estree(), false),
            None => (key.clone(), true),
        };
        json!({
            "type": "Property",
            "key": key,
            "computed": self.computed,
            "value": value,
            "kind": self.kind.as_str(),
            "method": self.method,
            "shorthand": shorthand,
        })
    }
}

impl Expression {
    /// The ESTree representation of the expression.
    pub fn estree(&self) -> Value {
        match self {
            Expression::This { .. } => json!({ "type": "ThisExpression" }),
            Expression::Identifier { name, .. } => ident(name),
            Expression::Null { .. } => json!({
                "type": "Literal", "value": Value::Null, "raw": "null",
            }),
            Expression::Boolean { value, raw, .. } => json!({
                "type": "Literal", "value": value, "raw": raw,
            }),
            Expression::Number { value, raw, .. } => json!({
                "type": "Literal", "value": value, "raw": raw,
            }),
            Expression::String { value, raw, .. } => json!({
                "type": "Literal", "value": value, "raw": raw,
            }),
            Expression::RegExp { pattern, flags, raw, .. } => json!({
                "type": "Literal",
                "value": raw,
                "raw": raw,
                "regex": { "pattern": pattern, "flags": flags },
            }),
            Expression::Array { elements, .. } => json!({
                "type": "ArrayExpression",
                "elements": elements
                    .iter()
                    .map(|e| e.as_ref().map(Expression::estree).unwrap_or(Value::Null))
                    .collect::<Vec<_>>(),
            }),
            Expression::Object { properties, .. } => json!({
                "type": "ObjectExpression",
                "properties": properties.iter().map(Property::estree).collect::<Vec<_>>(),
            }),
            Expression::Function(f) => f.estree(),
            Expression::Class(c) => c.estree(),
            Expression::Member { object, property, computed, optional, .. } => json!({
                "type": "MemberExpression",
                "computed": computed,
                "object": object.estree(),
                "property": property.estree(),
                "optional": optional,
            }),
            Expression::Call { callee, arguments, optional, .. } => json!({
                "type": "CallExpression",
                "callee": callee.estree(),
                "optional": optional,
                "arguments": arguments.iter().map(Expression::estree).collect::<Vec<_>>(),
            }),
            Expression::New { callee, arguments, .. } => json!({
                "type": "NewExpression",
                "callee": callee.estree(),
                "arguments": arguments.iter().map(Expression::estree).collect::<Vec<_>>(),
            }),
            Expression::Conditional { test, consequent, alternate, .. } => json!({
                "type": "ConditionalExpression",
                "test": test.estree(),
                "consequent": consequent.estree(),
                "alternate": alternate.estree(),
            }),
            Expression::Binary { operator, left, right, .. } => {
                let typ = if operator.is_logical() {
                    "LogicalExpression"
                } else {
                    "BinaryExpression"
                };
                json!({
                    "type": typ,
                    "operator": operator.as_str(),
                    "left": left.estree(),
                    "right": right.estree(),
                })
            }
            Expression::Assignment { operator, left, right, .. } => json!({
                "type": "AssignmentExpression",
                "operator": operator.as_str(),
                "left": left.estree(),
                "right": right.estree(),
            }),
            Expression::Update { operator, argument, .. } => json!({
                "type": "UpdateExpression",
                "operator": operator.as_str(),
                "argument": argument.estree(),
                "prefix": operator.prefix(),
            }),
            Expression::Unary { operator, argument, .. } => json!({
                "type": "UnaryExpression",
                "operator": operator.as_str(),
                "argument": argument.estree(),
                "prefix": true,
            }),
            Expression::Spread { argument, .. } => json!({
                "type": "SpreadElement",
                "argument": argument.estree(),
            }),
            Expression::Sequence { expressions, .. } => json!({
                "type": "SequenceExpression",
                "expressions": expressions.iter().map(Expression::estree).collect::<Vec<_>>(),
            }),
            // ESTree does not retain parentheses.
            Expression::Parenthesized { expression, .. } => expression.estree(),

            Expression::EmptyArrowHead { .. }
            | Expression::FloatingRest { .. }
            | Expression::ArrayRest { .. }
            | Expression::ObjectRest { .. } => {
                unreachable!("temporal node should not appear inside of ESTree")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Span;

    fn ident_expr(name: &str) -> Expression {
        Expression::Identifier {
            name: name.to_string(),
            span: Span::empty(),
        }
    }

    #[test]
    fn test_null_literal() {
        let e = Expression::Null { span: Span::empty() };
        assert_eq!(
            e.estree(),
            json!({ "type": "Literal", "value": null, "raw": "null" })
        );
    }

    #[test]
    fn test_regexp_literal() {
        let e = Expression::RegExp {
            pattern: "[/]".to_string(),
            flags: "g".to_string(),
            raw: "/[/]/g".to_string(),
            span: Span::empty(),
        };
        assert_eq!(
            e.estree(),
            json!({
                "type": "Literal",
                "value": "/[/]/g",
                "raw": "/[/]/g",
                "regex": { "pattern": "[/]", "flags": "g" },
            })
        );
    }

    #[test]
    fn test_logical_vs_binary() {
        let make = |op| Expression::Binary {
            operator: op,
            left: Box::new(ident_expr("a")),
            right: Box::new(ident_expr("b")),
            span: Span::empty(),
        };
        assert_eq!(make(BinaryOperator::LogicalAnd).estree()["type"], "LogicalExpression");
        assert_eq!(make(BinaryOperator::Coalesce).estree()["type"], "LogicalExpression");
        assert_eq!(make(BinaryOperator::BitOr).estree()["type"], "BinaryExpression");
        assert_eq!(make(BinaryOperator::BitOr).estree()["operator"], "|");
    }

    #[test]
    fn test_parenthesis_erased() {
        let e = Expression::Parenthesized {
            expression: Box::new(ident_expr("x")),
            span: Span::empty(),
        };
        assert_eq!(e.estree(), json!({ "type": "Identifier", "name": "x" }));
    }

    #[test]
    fn test_shorthand_property() {
        let p = Property {
            key: ident_expr("x"),
            computed: false,
            value: None,
            destructure_init: None,
            method: false,
            kind: PropertyKind::Init,
        };
        let v = p.estree();
        assert_eq!(v["shorthand"], true);
        assert_eq!(v["value"], v["key"]);
    }

    #[test]
    fn test_binding_property_default() {
        let p = BindingProperty {
            name: "x".to_string(),
            value: None,
            default: Some(Expression::Number {
                value: 1.0,
                raw: "1".to_string(),
                span: Span::empty(),
            }),
        };
        let v = p.estree();
        assert_eq!(v["shorthand"], true);
        assert_eq!(v["value"]["type"], "AssignmentPattern");
        assert_eq!(v["value"]["right"]["raw"], "1");
    }

    #[test]
    fn test_formal_parameters_rest() {
        let params = FormalParameters {
            parameters: vec![BindingElement {
                pattern: BindingPattern::Identifier("z".to_string()),
                default: None,
            }],
            rest: Some("w".to_string()),
        };
        let v = params.estree();
        assert_eq!(v[0]["name"], "z");
        assert_eq!(v[1]["type"], "RestElement");
        assert_eq!(v[1]["argument"]["name"], "w");
    }

    #[test]
    fn test_import_specifiers() {
        let import = ImportDeclaration {
            default_binding: Some("React".to_string()),
            namespace: None,
            named: Some(vec![NamedImport {
                name: "Component".to_string(),
                binding: Some("C".to_string()),
            }]),
            module: "react".to_string(),
            module_raw: "\"react\"".to_string(),
            span: Span::empty(),
        };
        let v = import.estree();
        assert_eq!(v["specifiers"][0]["type"], "ImportDefaultSpecifier");
        assert_eq!(v["specifiers"][0]["local"]["name"], "React");
        assert_eq!(v["specifiers"][1]["type"], "ImportSpecifier");
        assert_eq!(v["specifiers"][1]["imported"]["name"], "Component");
        assert_eq!(v["specifiers"][1]["local"]["name"], "C");
        assert_eq!(v["source"]["value"], "react");
    }
}
