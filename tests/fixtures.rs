//! End-to-end builds over small multi-file projects

use std::collections::{BTreeMap, HashMap};
use std::sync::Once;

use symgraph::adapter::{
    Extraction, ImportSpec, ImportedName, LocalBinding, RawDeclaration, RawUsage, SourceFile, UsageKind,
    parse_source,
};
use symgraph::{
    BuildOutput, DependencyManifest, Edge, EdgeKind, EngineConfig, Error, Graph, Language, ManifestUnit, Node,
    Pipeline, QualifiedName, SourceLocation, SymbolId, SymbolKind, UnresolvedReason, Visibility,
};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn pipeline() -> Pipeline {
    init_tracing();
    let mut config = EngineConfig::for_project("fixtures");
    config.threads = 4;
    Pipeline::new(config).unwrap()
}

fn q(name: &str) -> QualifiedName {
    QualifiedName::parse(name)
}

fn loc(file: &str, line: u32, column: u32) -> SourceLocation {
    SourceLocation::new(file, line, column)
}

fn one<'g>(graph: &'g Graph, language: Language, name: &str) -> &'g Node {
    let found = graph.lookup(language, &q(name));
    assert_eq!(found.len(), 1, "expected exactly one node named {name}");
    found[0]
}

fn names(nodes: &[&Node]) -> Vec<String> {
    let mut out: Vec<String> = nodes.iter().map(|n| n.qualified_name.to_string()).collect();
    out.sort();
    out.dedup();
    out
}

fn unresolved_reason(graph: &Graph, raw: &str) -> Option<UnresolvedReason> {
    graph
        .unresolved_edges()
        .into_iter()
        .filter_map(|e| e.target.unresolved())
        .find(|t| t.raw_name == raw)
        .map(|t| t.reason)
}

// C#: models, a service using them through a typed parameter, and a program
// wiring both together next to two libraries that are not analyzed.

fn person_cs() -> Extraction {
    let file = "Models/Person.cs";
    let mut e = Extraction::new(file, Language::CSharp);
    e.declare(RawDeclaration::new(SymbolKind::Module, "MyApp.Models", q(""), loc(file, 1, 1)));
    e.declare(RawDeclaration::new(SymbolKind::Type, "Person", q("MyApp.Models"), loc(file, 3, 5)));
    e.declare(RawDeclaration::new(SymbolKind::Property, "FirstName", q("MyApp.Models.Person"), loc(file, 5, 9)).with_type_hint("string"));
    e.declare(RawDeclaration::new(SymbolKind::Property, "LastName", q("MyApp.Models.Person"), loc(file, 6, 9)).with_type_hint("string"));
    e.declare(RawDeclaration::new(SymbolKind::Method, "GetFullName", q("MyApp.Models.Person"), loc(file, 8, 9)).with_arity(0));
    e.usage(RawUsage::new(UsageKind::Reference, "FirstName", q("MyApp.Models.Person.GetFullName"), loc(file, 10, 20)));
    e.usage(RawUsage::new(UsageKind::Reference, "LastName", q("MyApp.Models.Person.GetFullName"), loc(file, 10, 34)));
    e
}

fn greeting_service_cs() -> Extraction {
    let file = "Services/GreetingService.cs";
    let mut e = Extraction::new(file, Language::CSharp);
    e.usage(RawUsage::new(UsageKind::Import(ImportSpec::open()), "MyApp.Models", q(""), loc(file, 1, 1)));
    e.declare(RawDeclaration::new(SymbolKind::Module, "MyApp.Services", q(""), loc(file, 3, 1)));
    e.declare(RawDeclaration::new(SymbolKind::Type, "GreetingService", q("MyApp.Services"), loc(file, 5, 5)));
    e.declare(RawDeclaration::new(SymbolKind::Method, "Greet", q("MyApp.Services.GreetingService"), loc(file, 7, 9)).with_arity(1));
    e.bind(LocalBinding::new("person", "Person", q("MyApp.Services.GreetingService.Greet")));
    e.usage(RawUsage::new(UsageKind::call(0), "person.GetFullName", q("MyApp.Services.GreetingService.Greet"), loc(file, 9, 36)));
    e
}

fn program_cs() -> Extraction {
    let file = "Program.cs";
    let main = q("MyApp.Program.Main");
    let mut e = Extraction::new(file, Language::CSharp);
    for (line, namespace) in [(1, "System"), (2, "MyApp.Models"), (3, "MyApp.Services"), (4, "MyLibrary")] {
        e.usage(RawUsage::new(UsageKind::Import(ImportSpec::open()), namespace, q(""), loc(file, line, 1)));
    }
    e.declare(RawDeclaration::new(SymbolKind::Module, "MyApp", q(""), loc(file, 6, 1)));
    e.declare(RawDeclaration::new(SymbolKind::Type, "Program", q("MyApp"), loc(file, 8, 5)).with_visibility(Visibility::Internal));
    e.declare(
        RawDeclaration::new(SymbolKind::Method, "Main", q("MyApp.Program"), loc(file, 10, 9))
            .with_arity(1)
            .with_visibility(Visibility::Private),
    );
    e.bind(LocalBinding::new("person", "Person", main.clone()));
    e.bind(LocalBinding::new("greetingService", "GreetingService", main.clone()));
    e.usage(RawUsage::new(UsageKind::call(1), "Console.WriteLine", main.clone(), loc(file, 12, 13)));
    // new Person { FirstName = "John", LastName = "Doe" }
    e.usage(RawUsage::new(UsageKind::call(0), "Person", main.clone(), loc(file, 14, 26)));
    e.usage(RawUsage::new(UsageKind::Call { arity: None }, "Person.FirstName", main.clone(), loc(file, 14, 39)));
    e.usage(RawUsage::new(UsageKind::Call { arity: None }, "Person.LastName", main.clone(), loc(file, 14, 59)));
    e.usage(RawUsage::new(UsageKind::call(0), "person.GetFullName", main.clone(), loc(file, 15, 31)));
    e.usage(RawUsage::new(UsageKind::call(0), "GreetingService", main.clone(), loc(file, 17, 35)));
    e.usage(RawUsage::new(UsageKind::call(1), "greetingService.Greet", main.clone(), loc(file, 18, 31)));
    e.usage(RawUsage::new(UsageKind::call(2), "MathLibrary.Add", main, loc(file, 20, 31)));
    e
}

fn csharp_project() -> Vec<Extraction> {
    vec![person_cs(), greeting_service_cs(), program_cs()]
}

#[test]
fn test_csharp_program_calls_into_models_and_services() {
    let output = pipeline().build_extractions(csharp_project(), &[]).unwrap();
    let graph = &output.graph;

    let main = one(graph, Language::CSharp, "MyApp.Program.Main");
    let callees = names(&graph.callees_of(main.id));
    assert_eq!(
        callees,
        vec![
            "MyApp.Models.Person",
            "MyApp.Models.Person.FirstName",
            "MyApp.Models.Person.GetFullName",
            "MyApp.Models.Person.LastName",
            "MyApp.Services.GreetingService",
            "MyApp.Services.GreetingService.Greet",
        ]
    );

    let full_name = one(graph, Language::CSharp, "MyApp.Models.Person.GetFullName");
    assert_eq!(
        names(&graph.callers_of(full_name.id)),
        vec!["MyApp.Program.Main", "MyApp.Services.GreetingService.Greet"]
    );
    let call = graph
        .edges_to_by_kind(full_name.id, EdgeKind::Calls)
        .into_iter()
        .find(|e| e.source == main.id)
        .unwrap();
    assert_eq!(call.location, loc("Program.cs", 15, 31));

    assert_eq!(unresolved_reason(graph, "Console.WriteLine"), Some(UnresolvedReason::ExternalDependency));
    assert_eq!(unresolved_reason(graph, "MathLibrary.Add"), Some(UnresolvedReason::ExternalDependency));
    assert_eq!(unresolved_reason(graph, "System"), Some(UnresolvedReason::ExternalDependency));
    assert!(graph.edges().iter().all(|e| !e.visibility_violation));
}

#[test]
fn test_csharp_members_reference_their_siblings() {
    let output = pipeline().build_extractions(csharp_project(), &[]).unwrap();
    let graph = &output.graph;

    let full_name = one(graph, Language::CSharp, "MyApp.Models.Person.GetFullName");
    let mut referenced: Vec<String> = graph
        .edges_from_by_kind(full_name.id, EdgeKind::References)
        .into_iter()
        .filter_map(|e| e.target_id())
        .filter_map(|id| graph.node(id))
        .map(|n| n.name.clone())
        .collect();
    referenced.sort();
    assert_eq!(referenced, vec!["FirstName", "LastName"]);

    let person = one(graph, Language::CSharp, "MyApp.Models.Person");
    assert_eq!(
        names(&graph.members_of(person.id)),
        vec![
            "MyApp.Models.Person.FirstName",
            "MyApp.Models.Person.GetFullName",
            "MyApp.Models.Person.LastName",
        ]
    );
}

#[test]
fn test_csharp_imports_link_files() {
    let output = pipeline().build_extractions(csharp_project(), &[]).unwrap();
    let graph = &output.graph;

    let models = one(graph, Language::CSharp, "MyApp.Models");
    let importers: Vec<&Edge> = graph.edges_to_by_kind(models.id, EdgeKind::Imports);
    let mut files: Vec<&str> = importers.iter().map(|e| e.location.file.as_str()).collect();
    files.sort();
    assert_eq!(files, vec!["Program.cs", "Services/GreetingService.cs"]);

    let incoming = graph.cross_file_edges("Models/Person.cs");
    assert!(incoming.iter().any(|e| e.kind == EdgeKind::Calls && e.location.file == "Program.cs"));
}

// TypeScript, parsed from source text

const UTILS_TS: &str = r#"
export const PI = 3.14;

export function greet(name: string): string {
    return `Hello, ${name}`;
}
"#;

const ANOTHER_TS: &str = r#"
export function shout(text: string): string {
    return text.toUpperCase();
}
"#;

const SERVICE_TS: &str = r#"
import * as Utils from '../utils';

export function calculateCircumference(diameter: number): number {
    return diameter * Utils.PI;
}
"#;

const INDEX_TS: &str = r#"
import { greet, PI } from './utils';
import { shout as loud } from './utils/another';
import { calculateCircumference } from './services/service';

function main(): void {
    greet('John');
    loud(greet('Jane'));
    calculateCircumference(PI);
}
"#;

fn typescript_files() -> Vec<SourceFile> {
    [
        ("src/index.ts", INDEX_TS),
        ("src/utils.ts", UTILS_TS),
        ("src/utils/another.ts", ANOTHER_TS),
        ("src/services/service.ts", SERVICE_TS),
    ]
    .into_iter()
    .map(|(path, source)| parse_source(path, Language::TypeScript, source).unwrap())
    .collect()
}

#[test]
fn test_typescript_named_imports_and_calls() {
    let output = pipeline().build(&typescript_files(), &[]).unwrap();
    assert!(output.unparsed.is_empty());
    let graph = &output.graph;

    let main = one(graph, Language::TypeScript, "src.index.main");
    assert_eq!(
        names(&graph.callees_of(main.id)),
        vec![
            "src.services.service.calculateCircumference",
            "src.utils.another.shout",
            "src.utils.greet",
        ]
    );

    let index = one(graph, Language::TypeScript, "src.index");
    let imported: Vec<&Node> = graph
        .edges_from_by_kind(index.id, EdgeKind::Imports)
        .into_iter()
        .filter_map(|e| e.target_id())
        .filter_map(|id| graph.node(id))
        .collect();
    assert_eq!(
        names(&imported),
        vec![
            "src.services.service",
            "src.services.service.calculateCircumference",
            "src.utils",
            "src.utils.PI",
            "src.utils.another",
            "src.utils.another.shout",
            "src.utils.greet",
        ]
    );

    let pi = one(graph, Language::TypeScript, "src.utils.PI");
    let readers: Vec<&Node> = graph
        .edges_to_by_kind(pi.id, EdgeKind::References)
        .into_iter()
        .filter_map(|e| graph.node(e.source))
        .collect();
    assert_eq!(names(&readers), vec!["src.index.main", "src.services.service.calculateCircumference"]);
}

// A top-level script importing from a directory whose entry point is
// `utils/index.ts`, next to a sibling module in the same directory.

const UTILS_INDEX_TS: &str = r#"
export const PI = 3.14;

export function greet(name: string): string {
    return `Hello, ${name}`;
}
"#;

const ADD_TS: &str = r#"
export function add(a: number, b: number): number {
    return a + b;
}
"#;

const GREETING_SERVICE_TS: &str = r#"
import * as Utils from '../utils';

export function calculateCircumference(diameter: number): number {
    return diameter * Utils.PI;
}

export function displayGreeting(name: string): void {
    console.log(Utils.greet(name));
}
"#;

const SCRIPT_TS: &str = r#"
import { greet, PI } from './utils';
import { add } from './utils/another';
import { calculateCircumference, displayGreeting } from './services/service';

import * as path from 'path';

const userName = 'John';
displayGreeting(userName);

console.log(`The value of PI is ${PI}`);
console.log(`10 + 20 = ${add(10, 20)}`);
console.log(`Circumference for diameter of 2: ${calculateCircumference(2)}`);

console.log('The current filename is:', path.basename(__filename));
"#;

fn typescript_script_files() -> Vec<SourceFile> {
    [
        ("src/index.ts", SCRIPT_TS),
        ("src/utils/index.ts", UTILS_INDEX_TS),
        ("src/utils/another.ts", ADD_TS),
        ("src/services/service.ts", GREETING_SERVICE_TS),
    ]
    .into_iter()
    .map(|(path, source)| parse_source(path, Language::TypeScript, source).unwrap())
    .collect()
}

#[test]
fn test_typescript_top_level_script() {
    let output = pipeline().build(&typescript_script_files(), &[]).unwrap();
    assert!(output.unparsed.is_empty());
    let graph = &output.graph;

    // statements outside any function belong to the file module
    let script = one(graph, Language::TypeScript, "src.index");
    assert_eq!(
        names(&graph.callees_of(script.id)),
        vec![
            "src.services.service.calculateCircumference",
            "src.services.service.displayGreeting",
            "src.utils.another.add",
        ]
    );

    let imported: Vec<&Node> = graph
        .edges_from_by_kind(script.id, EdgeKind::Imports)
        .into_iter()
        .filter_map(|e| e.target_id())
        .filter_map(|id| graph.node(id))
        .collect();
    let imported = names(&imported);
    assert!(imported.contains(&"src.utils.index".to_string()));
    assert!(imported.contains(&"src.utils.index.greet".to_string()));
    assert!(imported.contains(&"src.utils.index.PI".to_string()));
    assert!(!imported.contains(&"src.utils".to_string()));

    let display = one(graph, Language::TypeScript, "src.services.service.displayGreeting");
    assert_eq!(names(&graph.callees_of(display.id)), vec!["src.utils.index.greet"]);

    let pi = one(graph, Language::TypeScript, "src.utils.index.PI");
    let readers: Vec<&Node> = graph
        .edges_to_by_kind(pi.id, EdgeKind::References)
        .into_iter()
        .filter_map(|e| graph.node(e.source))
        .collect();
    assert_eq!(names(&readers), vec!["src.index", "src.services.service.calculateCircumference"]);

    assert_eq!(unresolved_reason(graph, "path.basename"), Some(UnresolvedReason::ExternalDependency));
}

#[test]
fn test_typescript_builds_are_idempotent() {
    let first = pipeline().build(&typescript_files(), &[]).unwrap();
    let second = pipeline().build(&typescript_files(), &[]).unwrap();

    assert!(second.graph.diff(&first.graph).is_empty());
    assert_eq!(first.graph.edges(), second.graph.edges());
    assert_eq!(first.diagnostics, second.diagnostics);
    assert_eq!(first.graph.to_json().unwrap(), second.graph.to_json().unwrap());
}

#[test]
fn test_file_order_does_not_change_the_graph() {
    let forward = pipeline().build_extractions(csharp_project(), &[]).unwrap();
    let mut reversed = csharp_project();
    reversed.reverse();
    let backward = pipeline().build_extractions(reversed, &[]).unwrap();

    assert!(forward.graph.diff(&backward.graph).is_empty());
    assert_eq!(forward.diagnostics, backward.diagnostics);

    let mut files = typescript_files();
    let parsed = pipeline().build(&files, &[]).unwrap();
    files.reverse();
    let parsed_reversed = pipeline().build(&files, &[]).unwrap();
    assert_eq!(parsed.graph.edges(), parsed_reversed.graph.edges());
}

// Swift with a package manifest

fn swift_manifest() -> DependencyManifest {
    DependencyManifest::new("Package.swift", Language::Swift)
        .with_unit(ManifestUnit::module("App", loc("Package.swift", 8, 9)).depends_on(["Utilities", "Alamofire"]))
        .with_unit(ManifestUnit::module("Utilities", loc("Package.swift", 12, 9)))
}

fn swift_sources() -> Vec<Extraction> {
    let lib = "Sources/Utilities/Format.swift";
    let mut utilities = Extraction::new(lib, Language::Swift);
    utilities.declare(RawDeclaration::new(SymbolKind::Module, "Utilities", q(""), loc(lib, 1, 1)));
    utilities.declare(RawDeclaration::new(SymbolKind::Function, "format", q("Utilities"), loc(lib, 1, 1)).with_arity(1));

    let app = "Sources/App/main.swift";
    let mut main = Extraction::new(app, Language::Swift);
    main.usage(RawUsage::new(UsageKind::Import(ImportSpec::open()), "Utilities", q("App"), loc(app, 1, 1)));
    main.usage(RawUsage::new(UsageKind::Import(ImportSpec::open()), "Alamofire", q("App"), loc(app, 2, 1)));
    main.declare(RawDeclaration::new(SymbolKind::Module, "App", q(""), loc(app, 1, 1)));
    main.declare(RawDeclaration::new(SymbolKind::Function, "run", q("App"), loc(app, 4, 1)).with_arity(0));
    main.usage(RawUsage::new(UsageKind::call(1), "format", q("App.run"), loc(app, 5, 5)));
    main.usage(RawUsage::new(UsageKind::call(1), "AF.request", q("App.run"), loc(app, 6, 5)));
    vec![utilities, main]
}

#[test]
fn test_swift_manifest_dependencies() {
    let output = pipeline().build_extractions(swift_sources(), &[swift_manifest()]).unwrap();
    let graph = &output.graph;

    let app = one(graph, Language::Swift, "App");
    let utilities = one(graph, Language::Swift, "Utilities");
    assert!(graph
        .edges_from_by_kind(app.id, EdgeKind::Imports)
        .iter()
        .any(|e| e.target_id() == Some(utilities.id) && e.location.file == "Package.swift"));

    let format = one(graph, Language::Swift, "Utilities.format");
    assert_eq!(names(&graph.callers_of(format.id)), vec!["App.run"]);
    assert_eq!(unresolved_reason(graph, "Alamofire"), Some(UnresolvedReason::ExternalDependency));
    assert_eq!(unresolved_reason(graph, "AF.request"), Some(UnresolvedReason::ExternalDependency));

    // the manifest module and the source module are one node
    assert_eq!(app.locations.len(), 2);
}

// Python: method overrides across a relative import

const BASE_CLASS_PY: &str = r#"class Animal:
    def speak(self):
        return "Animal speaks"
"#;

const SUB_CLASSES_PY: &str = r#"from .base_class import Animal


class Dog(Animal):
    def speak(self):
        return "Dog barks"


class Cat(Animal):
    def speak(self):
        return "Cat meows"


class Lion(Cat):
    def speak(self):
        return "Lion roars"


dog = Dog()
cat = Cat()
lion = Lion()

print(dog.speak())
print(cat.speak())
print(lion.speak())
"#;

#[test]
fn test_python_method_overrides() {
    let files = vec![
        parse_source("method_override/base_class.py", Language::Python, BASE_CLASS_PY).unwrap(),
        parse_source("method_override/sub_classes.py", Language::Python, SUB_CLASSES_PY).unwrap(),
    ];
    let output = pipeline().build(&files, &[]).unwrap();
    assert!(output.unparsed.is_empty());
    let graph = &output.graph;

    let animal_speak = one(graph, Language::Python, "method_override.base_class.Animal.speak");
    let dog_speak = one(graph, Language::Python, "method_override.sub_classes.Dog.speak");
    let cat_speak = one(graph, Language::Python, "method_override.sub_classes.Cat.speak");
    let lion_speak = one(graph, Language::Python, "method_override.sub_classes.Lion.speak");
    assert_eq!(animal_speak.locations[0].line, 2);

    assert_eq!(names(&graph.overrides_of(dog_speak.id)), vec!["method_override.base_class.Animal.speak"]);
    assert_eq!(names(&graph.overrides_of(cat_speak.id)), vec!["method_override.base_class.Animal.speak"]);
    assert_eq!(names(&graph.overrides_of(lion_speak.id)), vec!["method_override.sub_classes.Cat.speak"]);
    assert!(graph.overrides_of(animal_speak.id).is_empty());

    assert_eq!(
        names(&graph.overridden_by(animal_speak.id)),
        vec!["method_override.sub_classes.Cat.speak", "method_override.sub_classes.Dog.speak"]
    );
    assert_eq!(names(&graph.overridden_by(cat_speak.id)), vec!["method_override.sub_classes.Lion.speak"]);
}

#[test]
fn test_unknown_names_stay_in_the_graph() {
    let file = "tools/report.py";
    let mut e = Extraction::new(file, Language::Python);
    e.declare(RawDeclaration::new(SymbolKind::Module, "tools.report", q(""), loc(file, 1, 1)));
    e.declare(RawDeclaration::new(SymbolKind::Function, "render", q("tools.report"), loc(file, 1, 1)).with_arity(0));
    e.usage(RawUsage::new(UsageKind::call(1), "summarize", q("tools.report.render"), loc(file, 2, 12)));

    let output = pipeline().build_extractions(vec![e], &[]).unwrap();
    let render = one(&output.graph, Language::Python, "tools.report.render");

    let unresolved = output.graph.unresolved_edges();
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].source, render.id);
    assert_eq!(unresolved_reason(&output.graph, "summarize"), Some(UnresolvedReason::NotFound));
    assert!(output.diagnostics.iter().any(|d| d.code() == "not_found"));
    assert_eq!(output.stats.not_found, 1);
}

#[test]
fn test_every_node_is_found_by_its_name_and_declared_once() {
    let mut outputs: Vec<BuildOutput> = vec![
        pipeline().build_extractions(csharp_project(), &[]).unwrap(),
        pipeline().build_extractions(swift_sources(), &[swift_manifest()]).unwrap(),
    ];
    outputs.push(pipeline().build(&typescript_files(), &[]).unwrap());

    for output in &outputs {
        let graph = &output.graph;
        let mut declared: HashMap<SymbolId, usize> = HashMap::new();
        for edge in graph.edges().iter().filter(|e| e.kind == EdgeKind::Declares) {
            if let Some(target) = edge.target_id() {
                *declared.entry(target).or_default() += 1;
            }
        }

        for node in graph.nodes() {
            assert!(graph.lookup(node.language, &node.qualified_name).iter().any(|n| n.id == node.id));
            if node.is_root() {
                assert!(!declared.contains_key(&node.id));
            } else {
                assert_eq!(declared.get(&node.id), Some(&1), "{} declared once", node.qualified_name);
            }
        }
    }
}

#[test]
fn test_dangling_edge_is_a_structural_defect() {
    let output = pipeline().build_extractions(swift_sources(), &[]).unwrap();
    let nodes: BTreeMap<SymbolId, Node> = output.graph.nodes().map(|n| (n.id, n.clone())).collect();
    let run = one(&output.graph, Language::Swift, "App.run");
    let ghost = SymbolId::derive("fixtures", Language::Swift, SymbolKind::Function, &q("App.ghost"), Some(0));

    let mut edges = output.graph.edges().to_vec();
    edges.push(Edge::new(EdgeKind::Calls, run.id, ghost, loc("Sources/App/main.swift", 7, 5)));

    let err = Graph::assemble(nodes, edges).unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, Error::Structural { missing, .. } if missing == ghost));
}

#[test]
fn test_named_import_of_missing_symbol() {
    let lib = "src/math.ts";
    let mut math = Extraction::new(lib, Language::TypeScript);
    math.declare(RawDeclaration::new(SymbolKind::Module, "src.math", q(""), loc(lib, 1, 1)));

    let app = "src/app.ts";
    let mut index = Extraction::new(app, Language::TypeScript);
    index.declare(RawDeclaration::new(SymbolKind::Module, "src.app", q(""), loc(app, 1, 1)));
    let spec = ImportSpec::named([ImportedName::new("missing")]);
    index.usage(RawUsage::new(UsageKind::Import(spec), "src.math", q("src.app"), loc(app, 1, 1)));

    let output = pipeline().build_extractions(vec![math, index], &[]).unwrap();
    assert_eq!(unresolved_reason(&output.graph, "src.math.missing"), Some(UnresolvedReason::NotFound));
}
