//! Reference Resolver
//!
//! Binds every usage to a node, or to an explicit [`UnresolvedTarget`] with
//! a reason. Works against a closed [`SymbolTable`] in three passes:
//! 1. imports: per-file [`FileContext`]s, manifest dependencies and `imports` edges
//! 2. inheritance clauses: `inherits`/`implements` edges and the base-type map
//! 3. calls and references, with member lookup walking base types
//!
//! Every pass only reads the table and writes its own output, so files are
//! resolved in parallel and merged afterwards.

pub mod imports;
pub mod target;

pub use imports::{FileContext, FileImport, ImportTarget, NamedBinding};
pub use target::TargetPath;

use crate::adapter::{Extraction, LocalBinding, RawUsage, UsageKind};
use crate::config::ResolutionConfig;
use crate::diagnostics::Diagnostic;
use crate::edge::{Edge, EdgeKind, UnresolvedReason, UnresolvedTarget};
use crate::id::SymbolId;
use crate::language::Language;
use crate::location::SourceLocation;
use crate::name::QualifiedName;
use crate::pipeline::{CancelToken, Phase};
use crate::registry::SymbolTable;
use crate::scope::{ScopeStrategies, ScopeStrategy};
use crate::symbol::{Node, SymbolKind, Visibility};
use crate::Result;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use tracing::{debug, info, warn};

/// Type hints and bindings may refer to each other; stop following after this
const MAX_HINT_DEPTH: usize = 8;

/// Resolution strategy used (for stats/debugging)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionStrategy {
    /// Found in an enclosing scope
    LocalScope,
    /// Bound through an import clause
    Import,
    /// Receiver keyword or typed local (`this.x`, `person.Name`)
    Receiver,
    /// Member found on a base type
    Inheritance,
    /// Top-level name
    GlobalName,
}

/// Outcome of resolving one usage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved {
        target: SymbolId,
        strategy: ResolutionStrategy,
    },
    Ambiguous {
        candidates: Vec<SymbolId>,
    },
    Unresolved {
        reason: UnresolvedReason,
    },
}

impl Resolution {
    fn not_found() -> Self {
        Resolution::Unresolved {
            reason: UnresolvedReason::NotFound,
        }
    }
}

/// Statistics from resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverStats {
    pub total: usize,
    pub resolved: usize,
    pub ambiguous: usize,
    pub not_found: usize,
    pub external: usize,
    pub visibility_violations: usize,
    pub by_local: usize,
    pub by_import: usize,
    pub by_receiver: usize,
    pub by_inheritance: usize,
    pub by_global: usize,
}

impl ResolverStats {
    fn record(&mut self, resolution: &Resolution) {
        self.total += 1;
        match resolution {
            Resolution::Resolved { strategy, .. } => {
                self.resolved += 1;
                match strategy {
                    ResolutionStrategy::LocalScope => self.by_local += 1,
                    ResolutionStrategy::Import => self.by_import += 1,
                    ResolutionStrategy::Receiver => self.by_receiver += 1,
                    ResolutionStrategy::Inheritance => self.by_inheritance += 1,
                    ResolutionStrategy::GlobalName => self.by_global += 1,
                }
            }
            Resolution::Ambiguous { .. } => self.ambiguous += 1,
            Resolution::Unresolved { reason } => match reason {
                UnresolvedReason::ExternalDependency => self.external += 1,
                _ => self.not_found += 1,
            },
        }
    }

    pub fn merge(&mut self, other: &ResolverStats) {
        self.total += other.total;
        self.resolved += other.resolved;
        self.ambiguous += other.ambiguous;
        self.not_found += other.not_found;
        self.external += other.external;
        self.visibility_violations += other.visibility_violations;
        self.by_local += other.by_local;
        self.by_import += other.by_import;
        self.by_receiver += other.by_receiver;
        self.by_inheritance += other.by_inheritance;
        self.by_global += other.by_global;
    }
}

impl std::fmt::Display for ResolverStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Resolution Statistics:")?;
        writeln!(f, "  Total usages: {}", self.total)?;
        writeln!(f, "  ✅ Resolved: {} ({:.1}%)",
            self.resolved,
            if self.total > 0 { self.resolved as f64 / self.total as f64 * 100.0 } else { 0.0 })?;
        writeln!(f, "  ⚠️  Ambiguous: {}", self.ambiguous)?;
        writeln!(f, "  📦 External: {}", self.external)?;
        writeln!(f, "  ❌ Not found: {}", self.not_found)?;
        writeln!(f, "  🔒 Visibility violations: {}", self.visibility_violations)?;
        writeln!(f, "  Resolution breakdown:")?;
        writeln!(f, "    Local scope: {}", self.by_local)?;
        writeln!(f, "    Import: {}", self.by_import)?;
        writeln!(f, "    Receiver: {}", self.by_receiver)?;
        writeln!(f, "    Inheritance: {}", self.by_inheritance)?;
        writeln!(f, "    Global name: {}", self.by_global)
    }
}

/// Edges and diagnostics produced by resolution
#[derive(Debug, Default)]
pub struct ResolveOutput {
    pub edges: Vec<Edge>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: ResolverStats,
}

impl ResolveOutput {
    fn merge(&mut self, other: ResolveOutput) {
        self.edges.extend(other.edges);
        self.diagnostics.extend(other.diagnostics);
        self.stats.merge(&other.stats);
    }
}

/// A root identifier bound to candidate nodes
#[derive(Debug)]
struct RootMatch {
    ids: Vec<SymbolId>,
    strategy: ResolutionStrategy,
    /// Reached through an import; namespaces only expose their public surface
    through_import: bool,
}

impl RootMatch {
    fn new(ids: Vec<SymbolId>, strategy: ResolutionStrategy) -> Self {
        Self {
            ids,
            strategy,
            through_import: false,
        }
    }

    fn imported(ids: Vec<SymbolId>) -> Self {
        Self {
            ids,
            strategy: ResolutionStrategy::Import,
            through_import: true,
        }
    }
}

/// Resolve every usage of `extractions` against a closed table.
pub fn resolve(
    table: &SymbolTable,
    strategies: &ScopeStrategies,
    config: &ResolutionConfig,
    extractions: &[Extraction],
    cancel: &CancelToken,
) -> Result<ResolveOutput> {
    let mut resolver = Resolver::new(table, strategies, config, extractions);
    resolver.run(extractions, cancel)
}

/// Reference resolver over a closed symbol table
pub struct Resolver<'a> {
    table: &'a SymbolTable,
    strategies: &'a ScopeStrategies,
    config: &'a ResolutionConfig,
    bindings: HashMap<&'a str, &'a [LocalBinding]>,
    contexts: HashMap<String, FileContext>,
    /// Direct base types of each type, from resolved inheritance clauses
    bases: HashMap<SymbolId, Vec<SymbolId>>,
    /// Dependency names declared by manifests, per language
    declared: BTreeMap<Language, BTreeSet<String>>,
    /// Declared dependencies that are not units of any manifest
    foreign: BTreeMap<Language, BTreeSet<String>>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        table: &'a SymbolTable,
        strategies: &'a ScopeStrategies,
        config: &'a ResolutionConfig,
        extractions: &'a [Extraction],
    ) -> Self {
        let bindings = extractions
            .iter()
            .map(|extraction| (extraction.path.as_str(), extraction.bindings.as_slice()))
            .collect();

        let mut declared: BTreeMap<Language, BTreeSet<String>> = BTreeMap::new();
        let mut foreign: BTreeMap<Language, BTreeSet<String>> = BTreeMap::new();
        for manifest in table.manifests() {
            declared
                .entry(manifest.language)
                .or_default()
                .extend(manifest.declared_dependencies().into_iter().map(str::to_string));
            foreign
                .entry(manifest.language)
                .or_default()
                .extend(manifest.foreign_dependencies().into_iter().map(str::to_string));
        }

        Self {
            table,
            strategies,
            config,
            bindings,
            contexts: HashMap::new(),
            bases: HashMap::new(),
            declared,
            foreign,
        }
    }

    /// Run all passes. Cancellation is checked between files.
    pub fn run(&mut self, extractions: &'a [Extraction], cancel: &CancelToken) -> Result<ResolveOutput> {
        let mut output = self.resolve_manifests();

        // Pass 1: imports
        let resolver = &*self;
        let per_file: Vec<(FileContext, ResolveOutput)> = extractions
            .par_iter()
            .map(|extraction| -> Result<(FileContext, ResolveOutput)> {
                cancel.check(Phase::Resolve)?;
                Ok(resolver.resolve_imports(extraction))
            })
            .collect::<Result<_>>()?;
        for (context, file_output) in per_file {
            self.contexts.insert(context.file.clone(), context);
            output.merge(file_output);
        }

        // Pass 2: inheritance clauses
        let resolver = &*self;
        let per_file: Vec<(ResolveOutput, Vec<(SymbolId, SymbolId)>)> = extractions
            .par_iter()
            .map(|extraction| -> Result<(ResolveOutput, Vec<(SymbolId, SymbolId)>)> {
                cancel.check(Phase::Resolve)?;
                Ok(resolver.resolve_hierarchy(extraction))
            })
            .collect::<Result<_>>()?;
        for (file_output, pairs) in per_file {
            output.merge(file_output);
            for (derived, base) in pairs {
                let bases = self.bases.entry(derived).or_default();
                if !bases.contains(&base) {
                    bases.push(base);
                }
            }
        }
        for bases in self.bases.values_mut() {
            bases.sort();
        }

        // Pass 3: calls and references
        let resolver = &*self;
        let per_file: Vec<ResolveOutput> = extractions
            .par_iter()
            .map(|extraction| -> Result<ResolveOutput> {
                cancel.check(Phase::Resolve)?;
                Ok(resolver.resolve_references(extraction))
            })
            .collect::<Result<_>>()?;
        for file_output in per_file {
            output.merge(file_output);
        }

        output.edges.sort();
        output.diagnostics.sort();
        info!(
            "Resolved {} of {} usages ({} ambiguous, {} external, {} not found)",
            output.stats.resolved,
            output.stats.total,
            output.stats.ambiguous,
            output.stats.external,
            output.stats.not_found
        );
        Ok(output)
    }

    fn strategy(&self, language: Language) -> &dyn ScopeStrategy {
        self.strategies.for_language(language)
    }

    /// Manifest dependencies become `imports` edges between units
    fn resolve_manifests(&self) -> ResolveOutput {
        let mut output = ResolveOutput::default();
        for manifest in self.table.manifests() {
            let language = manifest.language;
            for unit in &manifest.units {
                let Some(source) = self.namespace_named(language, &QualifiedName::parse(&unit.name)) else {
                    continue;
                };
                for dependency in &unit.dependencies {
                    let resolution = match self.namespace_named(language, &QualifiedName::parse(dependency)) {
                        Some(target) => Resolution::Resolved {
                            target,
                            strategy: ResolutionStrategy::Import,
                        },
                        None => Resolution::Unresolved {
                            reason: UnresolvedReason::ExternalDependency,
                        },
                    };
                    self.record(&mut output, EdgeKind::Imports, source, dependency, &unit.location, None, resolution);
                }
            }
        }
        output
    }

    fn namespace_named(&self, language: Language, name: &QualifiedName) -> Option<SymbolId> {
        self.table
            .named(language, name)
            .iter()
            .copied()
            .find(|id| self.table.node(*id).is_some_and(|node| node.kind.is_namespace()))
    }

    fn resolve_imports(&self, extraction: &Extraction) -> (FileContext, ResolveOutput) {
        let language = extraction.language;
        let mut context = FileContext::new(&extraction.path, language);
        let mut output = ResolveOutput::default();

        for usage in &extraction.usages {
            let UsageKind::Import(spec) = &usage.kind else {
                continue;
            };
            let Some(source) = self.source_for(language, &usage.scope, &usage.location) else {
                continue;
            };
            let module = QualifiedName::parse(&usage.target);
            let target = self.import_target(language, &module);
            debug!("Import {} in {} bound to {:?}", module, extraction.path, target);

            let module_resolutions = match &target {
                ImportTarget::Namespace(id) => vec![resolved(*id, ResolutionStrategy::Import)],
                ImportTarget::Symbols(ids) => ids.iter().map(|id| resolved(*id, ResolutionStrategy::Import)).collect(),
                ImportTarget::External => vec![Resolution::Unresolved {
                    reason: UnresolvedReason::ExternalDependency,
                }],
                ImportTarget::Missing => vec![Resolution::not_found()],
            };
            for resolution in module_resolutions {
                self.record(&mut output, EdgeKind::Imports, source, &usage.target, &usage.location, Some(usage), resolution);
            }

            for imported in &spec.names {
                let binding = match &target {
                    ImportTarget::Namespace(module_id) => {
                        let ids = self.table.members_named(*module_id, &imported.name);
                        let raw = format!("{}.{}", usage.target, imported.name);
                        if ids.is_empty() {
                            self.record(&mut output, EdgeKind::Imports, source, &raw, &usage.location, Some(usage), Resolution::not_found());
                        }
                        for id in &ids {
                            let resolution = resolved(*id, ResolutionStrategy::Import);
                            self.record(&mut output, EdgeKind::Imports, source, &raw, &usage.location, Some(usage), resolution);
                        }
                        NamedBinding { ids, external: false }
                    }
                    ImportTarget::External => NamedBinding {
                        ids: Vec::new(),
                        external: true,
                    },
                    ImportTarget::Symbols(_) | ImportTarget::Missing => NamedBinding::default(),
                };
                context.bind_name(imported.binding(), binding);
            }

            context.add_import(FileImport {
                module,
                spec: spec.clone(),
                target,
            });
        }

        (context, output)
    }

    fn import_target(&self, language: Language, module: &QualifiedName) -> ImportTarget {
        if module.is_root() {
            return ImportTarget::Missing;
        }
        let candidates = self.strategy(language).module_candidates(module);
        // a synthesized directory scope loses to a declared `index` module below it
        let declared = candidates.iter().find_map(|candidate| {
            self.namespace_named(language, candidate)
                .filter(|id| !self.table.is_implicit(*id))
        });
        if let Some(id) = declared {
            return ImportTarget::Namespace(id);
        }
        for candidate in candidates {
            if let Some(id) = self.namespace_named(language, &candidate) {
                return ImportTarget::Namespace(id);
            }
            let ids = self.table.named(language, &candidate);
            if !ids.is_empty() {
                return ImportTarget::Symbols(ids.to_vec());
            }
        }
        if self.is_external_module(language, module) {
            ImportTarget::External
        } else {
            ImportTarget::Missing
        }
    }

    /// Without a manifest every unanalyzed import is external; with one, only
    /// declared dependencies are.
    fn is_external_module(&self, language: Language, module: &QualifiedName) -> bool {
        match self.declared.get(&language) {
            None => true,
            Some(names) => module
                .ancestors()
                .filter(|prefix| !prefix.is_root())
                .any(|prefix| names.contains(&prefix.to_string())),
        }
    }

    fn resolve_hierarchy(&self, extraction: &Extraction) -> (ResolveOutput, Vec<(SymbolId, SymbolId)>) {
        let mut output = ResolveOutput::default();
        let mut pairs = Vec::new();
        let context = self.context_for(extraction);

        for usage in &extraction.usages {
            let kind = match usage.kind {
                UsageKind::Inherit => EdgeKind::Inherits,
                UsageKind::Implement => EdgeKind::Implements,
                _ => continue,
            };
            let Some(source) = self.source_for(extraction.language, &usage.scope, &usage.location) else {
                continue;
            };
            let resolution = self.resolve_usage(&context, usage);
            if let Some(base) = self.record(&mut output, kind, source, &usage.target, &usage.location, Some(usage), resolution) {
                let is_type = |id: SymbolId| self.table.node(id).is_some_and(|node| node.kind == SymbolKind::Type);
                if is_type(source) && is_type(base) && source != base {
                    pairs.push((source, base));
                }
            }
        }
        (output, pairs)
    }

    fn resolve_references(&self, extraction: &Extraction) -> ResolveOutput {
        let mut output = ResolveOutput::default();
        let context = self.context_for(extraction);

        for usage in &extraction.usages {
            let kind = match usage.kind {
                UsageKind::Call { .. } => EdgeKind::Calls,
                UsageKind::Reference => EdgeKind::References,
                _ => continue,
            };
            let Some(source) = self.source_for(extraction.language, &usage.scope, &usage.location) else {
                continue;
            };
            let resolution = self.resolve_usage(&context, usage);
            self.record(&mut output, kind, source, &usage.target, &usage.location, Some(usage), resolution);
        }
        debug!("Resolved {} usages in {}", output.stats.total, extraction.path);
        output
    }

    fn context_for(&self, extraction: &Extraction) -> FileContext {
        self.contexts
            .get(&extraction.path)
            .cloned()
            .unwrap_or_else(|| FileContext::new(&extraction.path, extraction.language))
    }

    /// The node a usage originates from: the innermost declared scope, else
    /// the language root.
    fn source_for(&self, language: Language, scope: &QualifiedName, location: &SourceLocation) -> Option<SymbolId> {
        for candidate in scope.ancestors().filter(|s| !s.is_root()) {
            let ids = self.table.named(language, &candidate);
            match ids {
                [] => continue,
                [id] => return Some(*id),
                // overloads: the declaration nearest above the use site
                many => {
                    let nearest = many
                        .iter()
                        .filter_map(|id| self.table.node(*id))
                        .filter_map(|node| {
                            node.locations
                                .iter()
                                .filter(|l| l.file == location.file && *l <= location)
                                .max()
                                .map(|l| (l.clone(), node.id))
                        })
                        .max();
                    return nearest.map(|(_, id)| id).or_else(|| many.first().copied());
                }
            }
        }
        self.table.root(language)
    }

    /// Resolve a call, reference or inheritance usage
    pub fn resolve_usage(&self, context: &FileContext, usage: &RawUsage) -> Resolution {
        let language = context.language;
        let path = TargetPath::parse(&usage.target);
        let Some(root) = path.root() else {
            return Resolution::not_found();
        };

        let Some(found) = self.resolve_root(context, root, &usage.scope, true, 0) else {
            return Resolution::Unresolved {
                reason: self.classify_missing(context, &path),
            };
        };

        let mut candidates = found.ids;
        let mut strategy = found.strategy;
        for member in path.members() {
            let mut next = Vec::new();
            for id in &candidates {
                let (ids, inherited) = self.member_lookup(*id, member, found.through_import, 0);
                if inherited {
                    strategy = ResolutionStrategy::Inheritance;
                }
                next.extend(ids);
            }
            next.sort();
            next.dedup();
            if next.is_empty() {
                debug!("No member `{}` on the way to `{}`", member, usage.target);
                return Resolution::not_found();
            }
            candidates = next;
        }

        let candidates = self.narrow(language, &usage.kind, candidates);
        match candidates.len() {
            0 => Resolution::not_found(),
            1 => resolved(candidates[0], strategy),
            _ => Resolution::Ambiguous { candidates },
        }
    }

    /// Bind the first path segment, walking outward from the use site
    fn resolve_root(
        &self,
        context: &FileContext,
        root: &str,
        scope: &QualifiedName,
        use_bindings: bool,
        depth: usize,
    ) -> Option<RootMatch> {
        let language = context.language;
        let strategy = self.strategy(language);

        if strategy.self_keywords().iter().any(|keyword| *keyword == root) {
            let owner = self.enclosing_type(language, scope)?;
            return Some(RootMatch::new(vec![owner], ResolutionStrategy::Receiver));
        }
        if strategy.base_keywords().iter().any(|keyword| *keyword == root) {
            let owner = self.enclosing_type(language, scope)?;
            let bases = self.bases.get(&owner).filter(|bases| !bases.is_empty())?;
            return Some(RootMatch::new(bases.clone(), ResolutionStrategy::Inheritance));
        }

        if use_bindings {
            if let Some(binding) = self.local_binding(&context.file, root, scope) {
                if let Some(ty) = self.resolve_type(context, &binding.type_name, &binding.scope, depth) {
                    return Some(RootMatch::new(vec![ty], ResolutionStrategy::Receiver));
                }
            }
        }

        for lexical in strategy.scope_chain(self.table, language, scope) {
            let ids = self.table.named(language, &lexical.child(root));
            if !ids.is_empty() {
                return Some(RootMatch::new(ids.to_vec(), ResolutionStrategy::LocalScope));
            }
        }

        if let Some(binding) = context.named(root) {
            return (!binding.ids.is_empty()).then(|| RootMatch::imported(binding.ids.clone()));
        }
        if let Some(import) = context.bound(root) {
            return match &import.target {
                ImportTarget::Namespace(id) if import.spec.alias.is_some() => Some(RootMatch::imported(vec![*id])),
                ImportTarget::Symbols(ids) => Some(RootMatch::imported(ids.clone())),
                ImportTarget::Namespace(_) => {
                    // `import a.b` binds `a`
                    let ids = self.table.named(language, &QualifiedName::from_segments([root]));
                    (!ids.is_empty()).then(|| RootMatch::imported(ids.to_vec()))
                }
                ImportTarget::External | ImportTarget::Missing => None,
            };
        }

        let mut open: Vec<SymbolId> = context
            .open_namespaces()
            .flat_map(|namespace| self.table.members_named(namespace, root))
            .filter(|id| self.is_exported(*id))
            .collect();
        if !open.is_empty() {
            open.sort();
            open.dedup();
            return Some(RootMatch::imported(open));
        }

        if strategy.global_scope_visible() {
            let ids = self.table.named(language, &QualifiedName::from_segments([root]));
            if !ids.is_empty() {
                return Some(RootMatch::new(ids.to_vec(), ResolutionStrategy::GlobalName));
            }
        }
        None
    }

    /// An open import of an unanalyzed unit only explains member access
    /// (`Console.WriteLine`); a bare unmatched name stays not found.
    fn classify_missing(&self, context: &FileContext, path: &TargetPath) -> UnresolvedReason {
        let Some(root) = path.root() else {
            return UnresolvedReason::NotFound;
        };
        let qualified = !path.members().is_empty();
        let external = context.binds_external(root)
            || (self.config.open_imports_are_external && qualified && context.has_external_open_import())
            || self.foreign.get(&context.language).is_some_and(|deps| deps.contains(root));
        if external {
            UnresolvedReason::ExternalDependency
        } else {
            UnresolvedReason::NotFound
        }
    }

    fn enclosing_type(&self, language: Language, scope: &QualifiedName) -> Option<SymbolId> {
        scope.ancestors().filter(|s| !s.is_root()).find_map(|candidate| {
            self.table
                .named(language, &candidate)
                .iter()
                .copied()
                .find(|id| self.table.node(*id).is_some_and(|node| node.kind == SymbolKind::Type))
        })
    }

    /// Innermost binding of `name` visible from `scope`
    fn local_binding(&self, file: &str, name: &str, scope: &QualifiedName) -> Option<&'a LocalBinding> {
        self.bindings
            .get(file)?
            .iter()
            .filter(|binding| binding.name == name && scope.starts_with(&binding.scope))
            .max_by_key(|binding| binding.scope.len())
    }

    /// Resolve a written type name to exactly one type node
    fn resolve_type(
        &self,
        context: &FileContext,
        type_name: &str,
        scope: &QualifiedName,
        depth: usize,
    ) -> Option<SymbolId> {
        if depth >= MAX_HINT_DEPTH {
            return None;
        }
        let path = TargetPath::parse(type_name);
        let found = self.resolve_root(context, path.root()?, scope, false, depth + 1)?;
        let mut ids = found.ids;
        for member in path.members() {
            ids = ids
                .iter()
                .flat_map(|id| self.member_lookup(*id, member, found.through_import, depth + 1).0)
                .collect();
        }
        let mut types = ids
            .into_iter()
            .filter(|id| self.table.node(*id).is_some_and(|node| node.kind == SymbolKind::Type));
        match (types.next(), types.next()) {
            (Some(ty), None) => Some(ty),
            _ => None,
        }
    }

    /// Members named `name` of a node; the flag is set when found on a base type
    fn member_lookup(&self, id: SymbolId, name: &str, through_import: bool, depth: usize) -> (Vec<SymbolId>, bool) {
        let Some(node) = self.table.node(id) else {
            return (Vec::new(), false);
        };
        match node.kind {
            SymbolKind::Type => self.type_members(id, name),
            SymbolKind::Module | SymbolKind::Package => {
                let mut ids = self.table.members_named(id, name);
                if through_import {
                    ids.retain(|member| self.is_exported(*member));
                }
                (ids, false)
            }
            _ => match self.hinted_type(node, depth) {
                Some(ty) => self.type_members(ty, name),
                None => (Vec::new(), false),
            },
        }
    }

    /// Members of a type, breadth-first through its base types
    fn type_members(&self, ty: SymbolId, name: &str) -> (Vec<SymbolId>, bool) {
        let direct = self.table.members_named(ty, name);
        if !direct.is_empty() {
            return (direct, false);
        }
        let mut visited = HashSet::from([ty]);
        let mut queue: VecDeque<SymbolId> = self.bases.get(&ty).into_iter().flatten().copied().collect();
        while let Some(base) = queue.pop_front() {
            if !visited.insert(base) {
                continue;
            }
            let found = self.table.members_named(base, name);
            if !found.is_empty() {
                return (found, true);
            }
            queue.extend(self.bases.get(&base).into_iter().flatten().copied());
        }
        (Vec::new(), false)
    }

    /// The declared type of a field, property or function result
    fn hinted_type(&self, node: &Node, depth: usize) -> Option<SymbolId> {
        let hint = node.type_hint.as_deref()?;
        let scope = node.qualified_name.parent()?;
        let fallback;
        let context = match self.contexts.get(&node.declaring_file) {
            Some(context) => context,
            None => {
                fallback = FileContext::new(&node.declaring_file, node.language);
                &fallback
            }
        };
        self.resolve_type(context, hint, &scope, depth + 1)
    }

    fn is_exported(&self, id: SymbolId) -> bool {
        self.table
            .node(id)
            .is_some_and(|node| node.visibility > Visibility::Private)
    }

    /// Kind-specific narrowing of the final candidate set
    fn narrow(&self, language: Language, kind: &UsageKind, candidates: Vec<SymbolId>) -> Vec<SymbolId> {
        match kind {
            UsageKind::Call { arity } => {
                let candidates = self.redirect_constructors(language, candidates);
                let candidates = self.prefer(candidates, |node| {
                    node.kind.is_callable() || node.kind == SymbolKind::Type
                });
                match arity {
                    Some(arity) if self.config.arity_overloads => self.filter_arity(candidates, *arity),
                    _ => candidates,
                }
            }
            UsageKind::Inherit | UsageKind::Implement => {
                self.prefer(candidates, |node| node.kind == SymbolKind::Type)
            }
            _ => candidates,
        }
    }

    /// A call of a type goes to its constructor when one is declared
    fn redirect_constructors(&self, language: Language, candidates: Vec<SymbolId>) -> Vec<SymbolId> {
        let strategy = self.strategy(language);
        let mut out = Vec::with_capacity(candidates.len());
        for id in candidates {
            let Some(node) = self.table.node(id).filter(|node| node.kind == SymbolKind::Type) else {
                out.push(id);
                continue;
            };
            let constructors: Vec<SymbolId> = strategy
                .constructor_names(&node.name)
                .iter()
                .flat_map(|name| self.table.members_named(id, name))
                .filter(|member| self.table.node(*member).is_some_and(|m| m.kind.is_callable()))
                .collect();
            if constructors.is_empty() {
                out.push(id);
            } else {
                out.extend(constructors);
            }
        }
        out.sort();
        out.dedup();
        out
    }

    fn prefer(&self, candidates: Vec<SymbolId>, keep: impl Fn(&Node) -> bool) -> Vec<SymbolId> {
        if candidates.len() < 2 {
            return candidates;
        }
        let preferred: Vec<SymbolId> = candidates
            .iter()
            .copied()
            .filter(|id| self.table.node(*id).is_some_and(&keep))
            .collect();
        if preferred.is_empty() { candidates } else { preferred }
    }

    /// Exactly one overload with the call's argument count wins; otherwise
    /// every candidate stays.
    fn filter_arity(&self, candidates: Vec<SymbolId>, arity: u32) -> Vec<SymbolId> {
        if candidates.len() < 2 {
            return candidates;
        }
        let survivors: Vec<SymbolId> = candidates
            .iter()
            .copied()
            .filter(|id| self.table.node(*id).is_some_and(|node| node.arity == Some(arity)))
            .collect();
        if survivors.len() == 1 { survivors } else { candidates }
    }

    /// Private targets are usable from their declaring file or from inside
    /// their owning type.
    fn violates_visibility(&self, target: &Node, usage: &RawUsage) -> bool {
        if target.visibility != Visibility::Private || target.is_declared_in(&usage.location.file) {
            return false;
        }
        let owner = target
            .parent
            .and_then(|parent| self.table.node(parent))
            .filter(|parent| parent.kind == SymbolKind::Type);
        !owner.is_some_and(|owner| usage.scope.starts_with(&owner.qualified_name))
    }

    /// Turn a resolution into an edge plus diagnostics; returns the target
    /// when resolved.
    #[allow(clippy::too_many_arguments)]
    fn record(
        &self,
        output: &mut ResolveOutput,
        kind: EdgeKind,
        source: SymbolId,
        raw: &str,
        location: &SourceLocation,
        usage: Option<&RawUsage>,
        resolution: Resolution,
    ) -> Option<SymbolId> {
        output.stats.record(&resolution);
        match resolution {
            Resolution::Resolved { target, strategy } => {
                let node = self.table.node(target);
                let violation = match (node, usage) {
                    (Some(node), Some(usage)) => self.violates_visibility(node, usage),
                    _ => false,
                };
                if violation {
                    output.stats.visibility_violations += 1;
                    if let Some(node) = node {
                        warn!("Private {} `{}` used at {}", node.kind, node.qualified_name, location);
                        output.diagnostics.push(Diagnostic::VisibilityViolation {
                            location: location.clone(),
                            target,
                            target_name: node.qualified_name.clone(),
                            source,
                        });
                    }
                }
                debug!("{} `{}` at {} -> {} ({:?})", kind, raw, location, target, strategy);
                output
                    .edges
                    .push(Edge::new(kind, source, target, location.clone()).with_visibility_violation(violation));
                Some(target)
            }
            Resolution::Ambiguous { candidates } => {
                let target = UnresolvedTarget::ambiguous(raw, candidates);
                debug!("Ambiguous {} `{}` at {} ({} candidates)", kind, raw, location, target.candidates.len());
                output.diagnostics.push(Diagnostic::Ambiguous {
                    location: location.clone(),
                    raw_name: raw.to_string(),
                    candidates: target.candidates.clone(),
                    source,
                });
                output.edges.push(Edge::unresolved(kind, source, target, location.clone()));
                None
            }
            Resolution::Unresolved { reason } => {
                debug!("Unresolved {} `{}` at {} ({})", kind, raw, location, reason);
                output.diagnostics.push(Diagnostic::Unresolved {
                    location: location.clone(),
                    raw_name: raw.to_string(),
                    reason,
                    source,
                });
                output
                    .edges
                    .push(Edge::unresolved(kind, source, UnresolvedTarget::new(raw, reason), location.clone()));
                None
            }
        }
    }
}

fn resolved(target: SymbolId, strategy: ResolutionStrategy) -> Resolution {
    Resolution::Resolved { target, strategy }
}
