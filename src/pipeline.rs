//! Build pipeline
//!
//! Runs the four phases in order, with hard barriers between them:
//! 1. adapt: files are extracted in parallel on a rayon pool; workers send
//!    [`ExtractMessage`]s over a crossbeam channel
//! 2. register: one writer thread drains the channel into the [`Registry`],
//!    then [`Registry::close`] hands out the read-only table
//! 3. resolve: parallel over files against the closed table
//! 4. assemble: single-threaded reduction into the [`Graph`]
//!
//! A [`CancelToken`] is checked between files; a cancelled phase discards its
//! partial work and the build returns [`Error::Cancelled`].

use crate::adapter::{AdapterRegistry, Extraction, SourceFile, default_registry};
use crate::config::EngineConfig;
use crate::diagnostics::{Diagnostic, count_by_severity};
use crate::graph::{CycleReport, Graph};
use crate::location::SourceLocation;
use crate::manifest::DependencyManifest;
use crate::registry::Registry;
use crate::resolver::{self, ResolverStats};
use crate::scope::ScopeStrategies;
use crate::{Error, Result};
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Build phases, in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Adapt,
    Register,
    Resolve,
    Assemble,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Adapt => "adapt",
            Phase::Register => "register",
            Phase::Resolve => "resolve",
            Phase::Assemble => "assemble",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shared cancellation flag
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Fail with [`Error::Cancelled`] once cancellation was requested
    pub fn check(&self, phase: Phase) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled { phase })
        } else {
            Ok(())
        }
    }
}

/// Sent from adapter workers to the registry writer
#[derive(Debug)]
pub enum ExtractMessage {
    Extracted(Extraction),
    Failed { path: String, message: String },
}

/// Everything a build produces
#[derive(Debug)]
pub struct BuildOutput {
    pub graph: Graph,
    /// Sorted; covers every phase
    pub diagnostics: Vec<Diagnostic>,
    /// Files the adapters could not extract, sorted
    pub unparsed: Vec<String>,
    pub stats: ResolverStats,
    pub cycles: CycleReport,
}

/// Registry state after the register phase
struct Registered {
    registry: Registry,
    extractions: Vec<Extraction>,
    unparsed: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

impl Registered {
    fn new(project: &str) -> Self {
        Self {
            registry: Registry::new(project),
            extractions: Vec::new(),
            unparsed: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Single writer: only this method mutates the registry
    fn accept(&mut self, message: ExtractMessage) {
        match message {
            ExtractMessage::Extracted(extraction) if extraction.is_empty() => {
                self.reject(extraction.path, "adapter produced no declarations or usages".to_string());
            }
            ExtractMessage::Extracted(extraction) => {
                let registered = self.registry.register_extraction(&extraction);
                debug!("Registered {} declarations from {}", registered, extraction.path);
                self.extractions.push(extraction);
            }
            ExtractMessage::Failed { path, message } => self.reject(path, message),
        }
    }

    fn reject(&mut self, path: String, message: String) {
        warn!("Unparsed {}: {}", path, message);
        self.diagnostics.push(Diagnostic::Unparsed {
            location: SourceLocation::new(path.as_str(), 1, 1),
            message,
        });
        self.unparsed.push(path);
    }
}

/// The symbol graph build pipeline
pub struct Pipeline {
    config: EngineConfig,
    adapters: AdapterRegistry,
    strategies: ScopeStrategies,
    pool: rayon::ThreadPool,
    cancel: CancelToken,
}

impl Pipeline {
    /// Create a pipeline with the bundled adapters and default scope rules
    pub fn new(config: EngineConfig) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(|i| format!("symgraph-worker-{}", i))
            .build()
            .map_err(|e| Error::Pool(e.to_string()))?;
        Ok(Self {
            config,
            adapters: default_registry(),
            strategies: ScopeStrategies::default(),
            pool,
            cancel: CancelToken::new(),
        })
    }

    pub fn with_adapters(mut self, adapters: AdapterRegistry) -> Self {
        self.adapters = adapters;
        self
    }

    pub fn with_strategies(mut self, strategies: ScopeStrategies) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Token that aborts a running build from another thread
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Build a graph from parsed source files
    pub fn build(&self, files: &[SourceFile], manifests: &[DependencyManifest]) -> Result<BuildOutput> {
        info!("Adapting {} files on {} workers", files.len(), self.pool.current_num_threads());
        let (tx, rx) = crossbeam::channel::unbounded::<ExtractMessage>();
        let project = self.config.project.as_str();

        let registered = std::thread::scope(|scope| -> Result<Registered> {
            let writer = scope.spawn(move || {
                let mut registered = Registered::new(project);
                for message in rx {
                    registered.accept(message);
                }
                registered
            });

            let adapted = self.pool.install(|| {
                files.par_iter().try_for_each_with(tx, |tx, file| -> Result<()> {
                    self.cancel.check(Phase::Adapt)?;
                    let message = match self.adapters.extract(file) {
                        Ok(extraction) => ExtractMessage::Extracted(extraction),
                        Err(e) => ExtractMessage::Failed {
                            path: file.path.clone(),
                            message: e.to_string(),
                        },
                    };
                    tx.send(message).map_err(|e| Error::Pool(e.to_string()))
                })
            });

            let registered = writer
                .join()
                .map_err(|_| Error::Pool("registry writer panicked".to_string()))?;
            adapted?;
            Ok(registered)
        })?;

        self.finish(registered, manifests)
    }

    /// Build a graph from extractions produced elsewhere
    pub fn build_extractions(
        &self,
        extractions: Vec<Extraction>,
        manifests: &[DependencyManifest],
    ) -> Result<BuildOutput> {
        let mut registered = Registered::new(&self.config.project);
        for extraction in extractions {
            self.cancel.check(Phase::Register)?;
            registered.accept(ExtractMessage::Extracted(extraction));
        }
        self.finish(registered, manifests)
    }

    fn finish(&self, registered: Registered, manifests: &[DependencyManifest]) -> Result<BuildOutput> {
        let Registered {
            mut registry,
            mut extractions,
            mut unparsed,
            mut diagnostics,
        } = registered;

        self.cancel.check(Phase::Register)?;
        for manifest in manifests {
            registry.register_manifest(manifest);
        }
        let table = registry.close();
        extractions.sort_by(|a, b| a.path.cmp(&b.path));

        let resolved = self.pool.install(|| {
            resolver::resolve(&table, &self.strategies, &self.config.resolution, &extractions, &self.cancel)
        })?;
        debug!("{}", resolved.stats);

        self.cancel.check(Phase::Assemble)?;
        diagnostics.extend_from_slice(table.diagnostics());
        diagnostics.extend(resolved.diagnostics);

        let (nodes, mut edges) = table.into_parts();
        edges.extend(resolved.edges);
        let graph = Graph::assemble(nodes, edges)?;

        let cycles = graph.cycle_detection_with(self.config.cycles.include_self_loops);
        diagnostics.extend(graph.import_cycle_diagnostics(&cycles));
        diagnostics.sort();
        diagnostics.dedup();
        unparsed.sort();

        let (infos, warnings, errors) = count_by_severity(&diagnostics);
        info!(
            "Build finished: {} nodes, {} edges, {} unparsed files, diagnostics: {} errors, {} warnings, {} info",
            graph.nodes().count(),
            graph.edges().len(),
            unparsed.len(),
            errors,
            warnings,
            infos
        );

        Ok(BuildOutput {
            graph,
            diagnostics,
            unparsed,
            stats: resolved.stats,
            cycles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{RawDeclaration, RawUsage, UsageKind, parse_source};
    use crate::language::Language;
    use crate::name::QualifiedName;
    use crate::symbol::SymbolKind;

    fn pipeline() -> Pipeline {
        let mut config = EngineConfig::for_project("demo");
        config.threads = 2;
        Pipeline::new(config).unwrap()
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Resolve.to_string(), "resolve");
        let err = Error::Cancelled { phase: Phase::Adapt };
        assert_eq!(err.to_string(), "Build cancelled during adapt phase");
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        let shared = token.clone();
        assert!(token.check(Phase::Adapt).is_ok());
        shared.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(Phase::Assemble), Err(Error::Cancelled { phase: Phase::Assemble })));
    }

    #[test]
    fn test_build_python_sources() {
        let files = vec![
            parse_source("shop/cart.py", Language::Python, "class Cart:\n    def total(self):\n        return 0\n").unwrap(),
            parse_source(
                "shop/main.py",
                Language::Python,
                "from shop.cart import Cart\n\ndef run():\n    cart = Cart()\n    return cart.total()\n",
            )
            .unwrap(),
        ];

        let output = pipeline().build(&files, &[]).unwrap();
        assert!(output.unparsed.is_empty());

        let graph = &output.graph;
        let total = graph.lookup(Language::Python, &QualifiedName::parse("shop.cart.Cart.total"));
        assert_eq!(total.len(), 1);
        let callers = graph.callers_of(total[0].id);
        assert_eq!(callers.len(), 1);
        assert_eq!(callers[0].qualified_name.to_string(), "shop.main.run");
    }

    #[test]
    fn test_missing_adapter_marks_file_unparsed() {
        let file = parse_source("app/main.py", Language::Python, "def main():\n    pass\n").unwrap();
        let output = pipeline()
            .with_adapters(AdapterRegistry::new())
            .build(&[file], &[])
            .unwrap();

        assert_eq!(output.unparsed, vec!["app/main.py".to_string()]);
        assert!(output.diagnostics.iter().any(|d| d.code() == "unparsed"));
    }

    #[test]
    fn test_syntax_errors_mark_file_unparsed() {
        let files = vec![
            parse_source("good.py", Language::Python, "def main():\n    pass\n").unwrap(),
            parse_source("broken.py", Language::Python, ")))\n").unwrap(),
        ];
        let output = pipeline().build(&files, &[]).unwrap();

        assert_eq!(output.unparsed, vec!["broken.py".to_string()]);
        assert!(output.graph.lookup(Language::Python, &QualifiedName::parse("good.main")).len() == 1);
        assert!(output.graph.lookup(Language::Python, &QualifiedName::parse("broken")).is_empty());
    }

    #[test]
    fn test_cancelled_build_returns_error() {
        let pipeline = pipeline();
        pipeline.cancel_token().cancel();

        let mut extraction = Extraction::new("a.go", Language::Go);
        let loc = SourceLocation::new("a.go", 1, 1);
        extraction.declare(RawDeclaration::new(SymbolKind::Function, "main", QualifiedName::parse("main"), loc.clone()));
        extraction.usage(RawUsage::new(UsageKind::call(0), "helper", QualifiedName::parse("main.main"), loc));

        let result = pipeline.build_extractions(vec![extraction], &[]);
        assert!(matches!(result, Err(Error::Cancelled { phase: Phase::Register })));
    }
}
