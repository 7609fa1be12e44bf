//! Destructuring flattening.
//!
//! Binding patterns in parameters and variable declarations flatten to
//! runs of simple `var` declarations; destructuring assignment
//! expressions flatten to comma sequences of simple assignments. Both
//! read from generated temporaries so each source sub-expression is
//! evaluated exactly once, in source order, and defaults keep their
//! short-circuit semantics through `v === void 0 ? default : v`.

use std::rc::Rc;

use esdown_ast::kind::BinaryOp;
use esdown_ast::node::{NodeKind, NodeRef};

use crate::context::TempHint;
use crate::es6::Es6Transformer;

/// Whether flattened bindings become `var` declarations or assignment
/// expressions.
enum FlattenMode {
    Declarations,
    Expressions,
}

struct FlattenState {
    mode: FlattenMode,
    declarations: Vec<NodeRef>,
    expressions: Vec<NodeRef>,
}

impl FlattenState {
    fn declarations() -> Self {
        Self {
            mode: FlattenMode::Declarations,
            declarations: Vec::new(),
            expressions: Vec::new(),
        }
    }

    fn expressions() -> Self {
        Self {
            mode: FlattenMode::Expressions,
            declarations: Vec::new(),
            expressions: Vec::new(),
        }
    }
}

impl Es6Transformer {
    /// Flatten a binding-pattern parameter into declarations reading
    /// from `value` (the generated parameter temp).
    pub(crate) fn flatten_parameter_destructuring(
        &mut self,
        param: &NodeRef,
        value: NodeRef,
    ) -> Vec<NodeRef> {
        let NodeKind::Parameter(p) = &param.kind else {
            return Vec::new();
        };
        let p = p.clone();
        let mut state = FlattenState::declarations();
        let value = match &p.initializer {
            Some(initializer) => self.default_value_check(&mut state, value, initializer),
            None => value,
        };
        self.emit_binding_pattern(&mut state, &p.name, value);
        state.declarations
    }

    /// Flatten a binding-pattern variable declaration using its own
    /// initializer as the source value.
    pub(crate) fn flatten_variable_destructuring(&mut self, decl: &NodeRef) -> Vec<NodeRef> {
        let NodeKind::VariableDeclaration(d) = &decl.kind else {
            return Vec::new();
        };
        let d = d.clone();
        let value = match &d.initializer {
            Some(initializer) => self.visit(initializer),
            None => {
                // An uninitialized pattern is a parse error upstream.
                debug_assert!(false, "destructuring declaration without initializer");
                self.cx.factory().void_zero()
            }
        };
        self.flatten_variable_destructuring_with_value(decl, value)
    }

    /// Flatten a binding-pattern variable declaration reading from a
    /// caller-supplied value (the `for-of` element access).
    pub(crate) fn flatten_variable_destructuring_with_value(
        &mut self,
        decl: &NodeRef,
        value: NodeRef,
    ) -> Vec<NodeRef> {
        let NodeKind::VariableDeclaration(d) = &decl.kind else {
            return Vec::new();
        };
        let name = d.name.clone();
        let mut state = FlattenState::declarations();
        self.emit_binding_pattern(&mut state, &name, value);
        state.declarations
    }

    /// Flatten `{...} = value` / `[...] = value`. When the produced
    /// value is needed (the assignment is not a bare statement), the
    /// source value is bound once and re-read as the final operand.
    pub(crate) fn flatten_destructuring_assignment(
        &mut self,
        node: &NodeRef,
        needs_value: bool,
    ) -> NodeRef {
        let fact = self.cx.factory();
        let NodeKind::Binary(bin) = &node.kind else {
            return self.visit(node);
        };
        let bin = bin.clone();

        let mut state = FlattenState::expressions();
        let mut value = self.visit(&bin.right);
        if needs_value {
            value = self.ensure_identifier(&mut state, value, true);
        }
        self.emit_assignment_target(&mut state, &bin.left, Rc::clone(&value));

        let mut expressions = state.expressions;
        if needs_value {
            expressions.push(value);
        }
        expressions
            .into_iter()
            .reduce(|acc, expr| fact.comma(acc, expr))
            .unwrap_or_else(|| fact.void_zero())
    }

    // =========================================================================
    // Shared recursion
    // =========================================================================

    fn flatten_push(&mut self, state: &mut FlattenState, target: NodeRef, value: NodeRef) {
        let fact = self.cx.factory();
        match state.mode {
            FlattenMode::Declarations => {
                state.declarations.push(fact.var_decl(target, Some(value)));
            }
            FlattenMode::Expressions => {
                state.expressions.push(fact.assign(target, value));
            }
        }
    }

    /// Bind `value` to a fresh temp so it can be read more than once.
    /// Declaration flattening adds a declaration; assignment flattening
    /// hoists the temp and assigns it in sequence.
    fn flatten_temp(&mut self, state: &mut FlattenState, value: NodeRef) -> NodeRef {
        let fact = self.cx.factory();
        let temp = self.cx.create_temp_variable(TempHint::Auto);
        match state.mode {
            FlattenMode::Declarations => {
                state
                    .declarations
                    .push(fact.var_decl(Rc::clone(&temp), Some(value)));
            }
            FlattenMode::Expressions => {
                self.cx.hoist_variable_declaration(&temp);
                state.expressions.push(fact.assign(Rc::clone(&temp), value));
            }
        }
        temp
    }

    fn ensure_identifier(
        &mut self,
        state: &mut FlattenState,
        value: NodeRef,
        reuse_identifier: bool,
    ) -> NodeRef {
        if reuse_identifier && matches!(value.kind, NodeKind::Identifier(_)) {
            value
        } else {
            self.flatten_temp(state, value)
        }
    }

    /// `value === void 0 ? <default> : value`, with `value` pre-bound to
    /// a temp so the check and the read agree.
    fn default_value_check(
        &mut self,
        state: &mut FlattenState,
        value: NodeRef,
        default: &NodeRef,
    ) -> NodeRef {
        let fact = self.cx.factory();
        let bound = self.ensure_identifier(state, value, false);
        let default = self.visit(default);
        let condition = fact.is_void_zero_check(Rc::clone(&bound));
        fact.conditional(condition, default, bound)
    }

    fn property_access_for_key(&mut self, value: NodeRef, key: &NodeRef) -> NodeRef {
        let fact = self.cx.factory();
        match &key.kind {
            NodeKind::Identifier(_) => fact.prop_access(value, fact.clone_identifier(key)),
            NodeKind::ComputedPropertyName(computed) => {
                let index = self.visit(&computed.expression);
                fact.elem_access(value, index)
            }
            _ => fact.elem_access(value, Rc::clone(key)),
        }
    }

    /// Recurse over a binding pattern, emitting one simple binding per
    /// leaf name.
    fn emit_binding_pattern(&mut self, state: &mut FlattenState, name: &NodeRef, value: NodeRef) {
        let fact = self.cx.factory();
        match &name.kind {
            NodeKind::ObjectBindingPattern(pattern) => {
                let elements = pattern.elements.clone();
                let value = if elements.len() > 1 {
                    self.ensure_identifier(state, value, true)
                } else {
                    value
                };
                for element in &elements {
                    let NodeKind::BindingElement(b) = &element.kind else {
                        continue;
                    };
                    let b = b.clone();
                    let key = b.property_name.as_ref().unwrap_or(&b.name);
                    let mut element_value =
                        self.property_access_for_key(Rc::clone(&value), key);
                    if let Some(initializer) = &b.initializer {
                        element_value =
                            self.default_value_check(state, element_value, initializer);
                    }
                    self.emit_binding_element(state, &b.name, element_value);
                }
            }
            NodeKind::ArrayBindingPattern(pattern) => {
                let elements = pattern.elements.clone();
                let value = if elements.len() > 1 {
                    self.ensure_identifier(state, value, true)
                } else {
                    value
                };
                for (index, element) in elements.iter().enumerate() {
                    let NodeKind::BindingElement(b) = &element.kind else {
                        continue;
                    };
                    let b = b.clone();
                    if b.dot_dot_dot {
                        let rest = fact.call(
                            fact.prop(Rc::clone(&value), "slice"),
                            vec![fact.number_of(index)],
                        );
                        self.emit_binding_element(state, &b.name, rest);
                        continue;
                    }
                    let mut element_value =
                        fact.elem_access(Rc::clone(&value), fact.number_of(index));
                    if let Some(initializer) = &b.initializer {
                        element_value =
                            self.default_value_check(state, element_value, initializer);
                    }
                    self.emit_binding_element(state, &b.name, element_value);
                }
            }
            _ => self.flatten_push(state, Rc::clone(name), value),
        }
    }

    fn emit_binding_element(&mut self, state: &mut FlattenState, name: &NodeRef, value: NodeRef) {
        if name.is_binding_pattern() {
            self.emit_binding_pattern(state, name, value);
        } else {
            self.flatten_push(state, Rc::clone(name), value);
        }
    }

    /// Recurse over a destructuring assignment target (array/object
    /// literal syntax), emitting simple assignments.
    fn emit_assignment_target(
        &mut self,
        state: &mut FlattenState,
        target: &NodeRef,
        value: NodeRef,
    ) {
        let fact = self.cx.factory();
        match &target.kind {
            NodeKind::Binary(b) if b.operator == BinaryOp::Assign => {
                // Element default: `[a = 1] = xs`.
                let b = b.clone();
                let value = self.default_value_check(state, value, &b.right);
                self.emit_assignment_target(state, &b.left, value);
            }
            NodeKind::ObjectLiteral(obj) => {
                let properties = obj.elements.clone();
                let value = if properties.len() > 1 {
                    self.ensure_identifier(state, value, true)
                } else {
                    value
                };
                for property in &properties {
                    match &property.kind {
                        NodeKind::PropertyAssignment(p) => {
                            let p = p.clone();
                            let element_value =
                                self.property_access_for_key(Rc::clone(&value), &p.name);
                            self.emit_assignment_target(state, &p.initializer, element_value);
                        }
                        NodeKind::ShorthandPropertyAssignment(s) => {
                            let s = s.clone();
                            let element_value = fact.prop_access(
                                Rc::clone(&value),
                                fact.clone_identifier(&s.name),
                            );
                            self.flatten_push(state, Rc::clone(&s.name), element_value);
                        }
                        _ => {}
                    }
                }
            }
            NodeKind::ArrayLiteral(arr) => {
                let elements = arr.elements.clone();
                let value = if elements.len() > 1 {
                    self.ensure_identifier(state, value, true)
                } else {
                    value
                };
                for (index, element) in elements.iter().enumerate() {
                    match &element.kind {
                        NodeKind::SpreadElement(spread) => {
                            let spread = spread.clone();
                            let rest = fact.call(
                                fact.prop(Rc::clone(&value), "slice"),
                                vec![fact.number_of(index)],
                            );
                            self.emit_assignment_target(state, &spread.expression, rest);
                        }
                        _ => {
                            let element_value =
                                fact.elem_access(Rc::clone(&value), fact.number_of(index));
                            self.emit_assignment_target(state, element, element_value);
                        }
                    }
                }
            }
            _ => {
                let target = self.visit(target);
                self.flatten_push(state, target, value);
            }
        }
    }
}
