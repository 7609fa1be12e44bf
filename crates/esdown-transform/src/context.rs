//! Transform context - the transformer façade.
//!
//! All mutable state of a single file transform lives here: the lexical
//! environment stack for hoisted declarations, the name generator, the
//! ancestor stack for parent queries, the substitution pipeline, and the
//! diagnostics sink. The lowering code reaches everything through this
//! one value, which keeps the rewriters themselves stateless.

use std::cell::RefCell;
use std::rc::Rc;

use esdown_ast::flags::NodeFlags;
use esdown_ast::node::{origin_of, NodeId, NodeRef};
use esdown_ast::printer::PrintSubstitutions;
use esdown_ast::visit::walk;
use esdown_ast::{NodeFactory, SyntaxKind};
use esdown_common::diagnostics::{diagnostic_codes, Diagnostic};
use esdown_common::options::TransformOptions;
use esdown_common::position::LineMap;
use esdown_common::span::Span;

use crate::resolver::EmitResolver;

// =============================================================================
// Name generation
// =============================================================================

/// Hint for temp variable allocation. The loop counter hint reuses the
/// canonical `_i` name once per transform; everything else cycles through
/// `_a` ... `_z`, then `_0`, `_1`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempHint {
    Auto,
    LoopCounter,
}

/// Allocates identifiers that are guaranteed unique against every source
/// identifier in the file and every previously generated name.
#[derive(Default)]
pub struct NameGenerator {
    used: rustc_hash::FxHashSet<String>,
    per_node: rustc_hash::FxHashMap<NodeId, Rc<str>>,
    temp_count: u32,
    reserved_i: bool,
}

impl NameGenerator {
    /// Seed the used-name set with every identifier in a source file.
    pub fn seed_from(&mut self, file: &NodeRef) {
        walk(file, &mut |node: &NodeRef| {
            if let Some(text) = node.identifier_text() {
                self.used.insert(text.to_string());
            }
        });
    }

    fn is_unique(&self, name: &str) -> bool {
        !self.used.contains(name)
    }

    /// Allocate a fresh temp name.
    pub fn make_temp(&mut self, hint: TempHint) -> String {
        if hint == TempHint::LoopCounter && !self.reserved_i && self.is_unique("_i") {
            self.reserved_i = true;
            self.used.insert("_i".to_string());
            return "_i".to_string();
        }
        loop {
            let count = self.temp_count;
            self.temp_count += 1;
            // Count 8 is `_i`, reserved for the loop-counter hint.
            if count == 8 {
                continue;
            }
            let name = if count < 26 {
                format!("_{}", (b'a' + count as u8) as char)
            } else {
                format!("_{}", count - 26)
            };
            if self.is_unique(&name) {
                self.used.insert(name.clone());
                return name;
            }
        }
    }

    /// Allocate a name derived from `base`, unique in the file.
    pub fn make_unique(&mut self, base: &str) -> String {
        let mut i = 1u32;
        loop {
            let name = format!("{base}_{i}");
            if self.is_unique(&name) {
                self.used.insert(name.clone());
                return name;
            }
            i += 1;
        }
    }

    /// The stable generated name for a node, allocated on first use.
    /// With no base name to derive from, the node gets a plain temp.
    pub fn name_for_node(&mut self, node: &NodeRef, base: Option<&str>) -> Rc<str> {
        if let Some(name) = self.per_node.get(&node.id) {
            return Rc::clone(name);
        }
        let name: Rc<str> = match base {
            Some(base) => self.make_unique(base).into(),
            None => self.make_temp(TempHint::Auto).into(),
        };
        self.per_node.insert(node.id, Rc::clone(&name));
        name
    }
}

// =============================================================================
// Substitution pipeline
// =============================================================================

/// One emit-time rewrite stage. Stages are registered in order; each sees
/// the output of its predecessors, which is how transforms compose.
pub trait SubstitutionStage {
    /// Substitution for identifiers at declaration sites.
    fn substitute_binding_name(&self, _ancestors: &[NodeRef], _node: &NodeRef) -> Option<NodeRef> {
        None
    }

    /// Substitution for identifiers and `this` at reference sites.
    fn substitute_expression(&self, _ancestors: &[NodeRef], _node: &NodeRef) -> Option<NodeRef> {
        None
    }
}

/// The ordered list of substitution stages an emitter consults.
#[derive(Default, Clone)]
pub struct SubstitutionPipeline {
    stages: Vec<Rc<dyn SubstitutionStage>>,
}

impl SubstitutionPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage after every previously registered stage.
    pub fn push_stage(&mut self, stage: Rc<dyn SubstitutionStage>) {
        self.stages.push(stage);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    fn apply(
        &self,
        ancestors: &[NodeRef],
        node: &NodeRef,
        f: impl Fn(&dyn SubstitutionStage, &[NodeRef], &NodeRef) -> Option<NodeRef>,
    ) -> Option<NodeRef> {
        let mut current: Option<NodeRef> = None;
        for stage in &self.stages {
            let input = current.as_ref().unwrap_or(node);
            if let Some(next) = f(stage.as_ref(), ancestors, input) {
                current = Some(next);
            }
        }
        current
    }
}

impl PrintSubstitutions for SubstitutionPipeline {
    fn substitute_binding_name(&self, ancestors: &[NodeRef], node: &NodeRef) -> Option<NodeRef> {
        self.apply(ancestors, node, |stage, a, n| {
            stage.substitute_binding_name(a, n)
        })
    }

    fn substitute_expression(&self, ancestors: &[NodeRef], node: &NodeRef) -> Option<NodeRef> {
        self.apply(ancestors, node, |stage, a, n| {
            stage.substitute_expression(a, n)
        })
    }
}

// =============================================================================
// Transform context
// =============================================================================

struct CurrentFile {
    file_name: Rc<str>,
    text: Rc<str>,
    line_map: Option<LineMap>,
}

pub struct TransformContext {
    options: TransformOptions,
    factory: NodeFactory,
    resolver: Rc<dyn EmitResolver>,
    lexical_environment: Vec<Vec<NodeRef>>,
    node_stack: Vec<NodeRef>,
    names: Rc<RefCell<NameGenerator>>,
    no_substitution: Rc<RefCell<rustc_hash::FxHashSet<NodeId>>>,
    substitutions: SubstitutionPipeline,
    diagnostics: Vec<Diagnostic>,
    current_file: Option<CurrentFile>,
}

impl TransformContext {
    #[must_use]
    pub fn new(options: TransformOptions, resolver: Rc<dyn EmitResolver>) -> Self {
        Self {
            options,
            factory: NodeFactory::new(),
            resolver,
            lexical_environment: Vec::new(),
            node_stack: Vec::new(),
            names: Rc::new(RefCell::new(NameGenerator::default())),
            no_substitution: Rc::new(RefCell::new(rustc_hash::FxHashSet::default())),
            substitutions: SubstitutionPipeline::new(),
            diagnostics: Vec::new(),
            current_file: None,
        }
    }

    #[must_use]
    pub fn options(&self) -> TransformOptions {
        self.options
    }

    /// A handle on the shared node factory.
    #[must_use]
    pub fn factory(&self) -> NodeFactory {
        self.factory.clone()
    }

    #[must_use]
    pub fn resolver(&self) -> Rc<dyn EmitResolver> {
        Rc::clone(&self.resolver)
    }

    // =========================================================================
    // Current file
    // =========================================================================

    /// Begin a file transform: remember the file for raw-text access and
    /// seed the name generator with its identifiers.
    pub fn set_current_file(&mut self, file: &NodeRef) {
        if let esdown_ast::node::NodeKind::SourceFile(data) = &file.kind {
            self.current_file = Some(CurrentFile {
                file_name: Rc::clone(&data.file_name),
                text: Rc::clone(&data.text),
                line_map: None,
            });
        }
        self.names.borrow_mut().seed_from(file);
    }

    /// The full text of the file under transform.
    #[must_use]
    pub fn current_source_text(&self) -> Option<Rc<str>> {
        self.current_file.as_ref().map(|f| Rc::clone(&f.text))
    }

    // =========================================================================
    // Ancestor queries
    // =========================================================================

    pub fn push_node(&mut self, node: &NodeRef) {
        self.node_stack.push(Rc::clone(node));
    }

    pub fn pop_node(&mut self) {
        self.node_stack.pop();
    }

    /// The parent of the node currently being visited.
    #[must_use]
    pub fn get_parent_node(&self) -> Option<&NodeRef> {
        if self.node_stack.len() >= 2 {
            self.node_stack.get(self.node_stack.len() - 2)
        } else {
            None
        }
    }

    /// The nearest enclosing node (excluding the current one) matching
    /// the predicate.
    #[must_use]
    pub fn find_ancestor_node(&self, predicate: impl Fn(&NodeRef) -> bool) -> Option<&NodeRef> {
        self.node_stack.iter().rev().skip(1).find(|n| predicate(n))
    }

    /// The traversal stack, innermost node last.
    #[must_use]
    pub fn ancestors(&self) -> &[NodeRef] {
        &self.node_stack
    }

    // =========================================================================
    // Lexical environment
    // =========================================================================

    /// Open a hoisting scope. Every `start` must be matched by exactly
    /// one `end` on every control path out of the body being built.
    pub fn start_lexical_environment(&mut self) {
        self.lexical_environment.push(Vec::new());
    }

    /// Close the current hoisting scope, returning a `var` statement for
    /// the declarations hoisted into it, if any.
    pub fn end_lexical_environment(&mut self) -> Option<NodeRef> {
        let decls = self
            .lexical_environment
            .pop()
            .expect("unbalanced lexical environment");
        if decls.is_empty() {
            return None;
        }
        let list = self.factory.var_declaration_list(NodeFlags::empty(), decls);
        let stmt = self.factory.var_stmt(list);
        Some(self.factory.with_flags(&stmt, NodeFlags::GENERATED))
    }

    /// Current bracket depth; zero after a balanced transform.
    #[must_use]
    pub fn environment_depth(&self) -> usize {
        self.lexical_environment.len()
    }

    /// Hoist a `var` declaration for `name` into the nearest scope.
    pub fn hoist_variable_declaration(&mut self, name: &NodeRef) {
        let decl = self.factory.var_decl(Rc::clone(name), None);
        self.lexical_environment
            .last_mut()
            .expect("hoist outside lexical environment")
            .push(decl);
    }

    // =========================================================================
    // Name and temp allocation
    // =========================================================================

    /// A fresh temp identifier, not hoisted.
    #[must_use]
    pub fn create_temp_variable(&mut self, hint: TempHint) -> NodeRef {
        let name = self.names.borrow_mut().make_temp(hint);
        self.factory.ident(&name)
    }

    /// A fresh temp identifier, hoisted into the nearest scope.
    #[must_use]
    pub fn create_hoisted_temp(&mut self, hint: TempHint) -> NodeRef {
        let temp = self.create_temp_variable(hint);
        self.hoist_variable_declaration(&temp);
        temp
    }

    /// The stable generated name for a node, as an identifier.
    #[must_use]
    pub fn get_generated_name_for_node(&mut self, node: &NodeRef) -> NodeRef {
        let base = node
            .identifier_text()
            .map(|t| t.to_string())
            .or_else(|| declared_name_text(node));
        let name = self
            .names
            .borrow_mut()
            .name_for_node(node, base.as_deref());
        self.factory.ident(&name)
    }

    /// Shared handle for substitution stages.
    #[must_use]
    pub fn names(&self) -> Rc<RefCell<NameGenerator>> {
        Rc::clone(&self.names)
    }

    // =========================================================================
    // Substitution
    // =========================================================================

    /// Register a substitution stage after all previously registered
    /// stages.
    pub fn push_substitution_stage(&mut self, stage: Rc<dyn SubstitutionStage>) {
        self.substitutions.push_stage(stage);
    }

    #[must_use]
    pub fn substitutions(&self) -> SubstitutionPipeline {
        self.substitutions.clone()
    }

    /// Shared suppression set: node ids whose substitution is disabled
    /// (freshly generated names must not be rewritten again).
    #[must_use]
    pub fn no_substitution(&self) -> Rc<RefCell<rustc_hash::FxHashSet<NodeId>>> {
        Rc::clone(&self.no_substitution)
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Report an ES6-flagged node the dispatcher does not know, naming
    /// file, line and column of its source position.
    pub fn report_unhandled_node(&mut self, node: &NodeRef) {
        let span = origin_of(node).span;
        let (file, line, column) = self.resolve_position(span);
        tracing::warn!(
            kind = %node.syntax_kind(),
            file = %file,
            line,
            column,
            "unhandled syntax kind in down-level transform"
        );
        self.diagnostics.push(Diagnostic::error(
            file,
            line,
            column,
            format!(
                "Unhandled syntax kind in ES6 down-level transform: {}",
                node.syntax_kind()
            ),
            diagnostic_codes::UNHANDLED_SYNTAX_KIND,
        ));
    }

    fn resolve_position(&mut self, span: Span) -> (String, u32, u32) {
        let Some(file) = self.current_file.as_mut() else {
            return (String::new(), 0, 0);
        };
        if span.is_dummy() {
            return (file.file_name.to_string(), 0, 0);
        }
        let map = file
            .line_map
            .get_or_insert_with(|| LineMap::build(&file.text));
        let pos = map.line_and_column(span.start);
        (file.file_name.to_string(), pos.line, pos.column)
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

/// Best-effort name text for declarations (functions, classes,
/// variables) used to seed generated names.
fn declared_name_text(node: &NodeRef) -> Option<String> {
    use esdown_ast::node::NodeKind;
    let name = match &node.kind {
        NodeKind::FunctionDeclaration(f)
        | NodeKind::FunctionExpression(f)
        | NodeKind::MethodDeclaration(f)
        | NodeKind::GetAccessor(f)
        | NodeKind::SetAccessor(f) => f.name.clone(),
        NodeKind::ClassDeclaration(c) | NodeKind::ClassExpression(c) => {
            // Unnamed class expressions still derive a readable name.
            if c.name.is_none() {
                return Some("class".to_string());
            }
            c.name.clone()
        }
        NodeKind::VariableDeclaration(d) => Some(d.name.clone()),
        NodeKind::Parameter(p) => Some(p.name.clone()),
        _ => None,
    }?;
    name.identifier_text().map(|t| t.to_string())
}

/// Nodes that establish a `this` container for substitution queries,
/// looking through `original` pointers so a function synthesized from an
/// arrow still reads as an arrow.
#[must_use]
pub fn effective_this_container_kind(node: &NodeRef) -> Option<SyntaxKind> {
    let kind = origin_of(node).syntax_kind();
    if kind.is_this_container() || kind == SyntaxKind::ArrowFunction {
        Some(kind)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "tests/context_tests.rs"]
mod tests;
