//! routedrill CLI - Debug tool for route parsing and drill logic
//!
//! Usage:
//!   routedrill-cli steps <route.json>
//!   routedrill-cli overlay <route.json> [--annotations <file>] [--roads <file>] [--step <i>]
//!   routedrill-cli drive <route.json> [--spacing <m>]
//!   routedrill-cli trainer <annotations.json> [--state-dir <dir>] [--mark <n>]
//!
//! This tool runs the client-side logic over locally saved backend payloads
//! and shows verbose debug output, helping to understand which annotations
//! match a route and how the walkthrough and trainer advance.

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use routedrill::{
    nav::DRIVE_SAMPLE_SPACING_M,
    overlay::plan_overlay,
    proximity::{
        annotations_near_step, dedupe_by_grid, filter_annotations_near, filter_roads_near,
        ROUTE_INTERSECTION_RADIUS_M, ROUTE_SPEED_ROAD_RADIUS_M, SIGN_DEDUPE_CELL_M,
        STEP_INTERSECTION_RADIUS_M,
    },
    storage::FileStore,
    Annotation, FilterState, NavigationController, PracticeRoute, RoadSegment, StreetIndex,
    TrainerScheduler, VillaStreet,
};

#[derive(Parser)]
#[command(name = "routedrill-cli")]
#[command(about = "Debug tool for route parsing and drill logic", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a route payload and print the step walkthrough
    Steps {
        /// Route JSON file (a route object or a generate response)
        route: PathBuf,
    },

    /// Match annotations and roads against a route
    Overlay {
        /// Route JSON file (a route object or a generate response)
        route: PathBuf,

        /// Annotations JSON file (array or feed envelope)
        #[arg(short, long)]
        annotations: Option<PathBuf>,

        /// Speed-limit roads JSON file (array or feed envelope)
        #[arg(short, long)]
        roads: Option<PathBuf>,

        /// Restrict matching to one step instead of the whole route
        #[arg(short, long)]
        step: Option<usize>,
    },

    /// Simulate the drive-through over a route polyline
    Drive {
        /// Route JSON file (a route object or a generate response)
        route: PathBuf,

        /// Sample spacing in meters
        #[arg(long, default_value_t = DRIVE_SAMPLE_SPACING_M)]
        spacing: f64,

        /// Print at most this many frames
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Run a trainer session over a junction catalog
    Trainer {
        /// Annotations JSON file (array or feed envelope)
        annotations: PathBuf,

        /// Villa streets JSON file, for junction context lines
        #[arg(long)]
        villa: Option<PathBuf>,

        /// Directory holding persisted progress
        #[arg(long, default_value = ".routedrill")]
        state_dir: PathBuf,

        /// Mark this many items seen, then show progress
        #[arg(long, default_value = "0")]
        mark: usize,

        /// Clear persisted progress before the session
        #[arg(long)]
        reset: bool,

        /// Seed the shuffle for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Steps { route } => run_steps(&route, cli.verbose),
        Commands::Overlay {
            route,
            annotations,
            roads,
            step,
        } => run_overlay(
            &route,
            annotations.as_ref(),
            roads.as_ref(),
            step,
            cli.verbose,
        ),
        Commands::Drive {
            route,
            spacing,
            limit,
        } => run_drive(&route, spacing, limit, cli.verbose),
        Commands::Trainer {
            annotations,
            villa,
            state_dir,
            mark,
            reset,
            seed,
        } => run_trainer(
            &annotations,
            villa.as_ref(),
            &state_dir,
            mark,
            reset,
            seed,
            cli.verbose,
        ),
    }
}

// ============================================================================
// Payload loading
// ============================================================================

/// Load a route from a file holding either a single route object or a
/// generate-response envelope (the first route is taken).
fn load_route(path: &PathBuf) -> Option<PracticeRoute> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("  [ERR] Failed to read {}: {}", path.display(), e);
            return None;
        }
    };

    if let Ok(route) = serde_json::from_str::<PracticeRoute>(&raw) {
        if !route.polyline.is_empty() || !route.legs.is_empty() {
            return Some(route);
        }
    }

    #[derive(serde::Deserialize)]
    struct Envelope {
        #[serde(default)]
        routes: Vec<PracticeRoute>,
    }

    match serde_json::from_str::<Envelope>(&raw) {
        Ok(envelope) => {
            if envelope.routes.is_empty() {
                eprintln!("  [ERR] {} contains no routes", path.display());
                None
            } else {
                envelope.routes.into_iter().next()
            }
        }
        Err(e) => {
            eprintln!("  [ERR] Failed to parse {}: {}", path.display(), e);
            None
        }
    }
}

/// Load annotations from a plain array or any of the feed envelopes.
fn load_annotations(path: &PathBuf) -> Vec<Annotation> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("  [ERR] Failed to read {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    if let Ok(list) = serde_json::from_str::<Vec<Annotation>>(&raw) {
        return list;
    }

    #[derive(serde::Deserialize)]
    struct Envelope {
        #[serde(default)]
        intersections: Vec<Annotation>,
        #[serde(default)]
        hojre_vigepligt: Vec<Annotation>,
        #[serde(default)]
        signed: Vec<Annotation>,
    }

    match serde_json::from_str::<Envelope>(&raw) {
        Ok(mut envelope) => {
            let mut all = envelope.intersections;
            all.append(&mut envelope.hojre_vigepligt);
            all.append(&mut envelope.signed);
            all
        }
        Err(e) => {
            eprintln!("  [ERR] Failed to parse {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Load roads from a plain array or the speed-limits envelope.
fn load_roads(path: &PathBuf) -> Vec<RoadSegment> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("  [ERR] Failed to read {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    if let Ok(list) = serde_json::from_str::<Vec<RoadSegment>>(&raw) {
        return list;
    }

    #[derive(serde::Deserialize)]
    struct Envelope {
        #[serde(default)]
        roads: Vec<RoadSegment>,
    }

    match serde_json::from_str::<Envelope>(&raw) {
        Ok(envelope) => envelope.roads,
        Err(e) => {
            eprintln!("  [ERR] Failed to parse {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Load villa streets from a plain array or the villa-areas envelope.
fn load_villa_streets(path: &PathBuf) -> Vec<VillaStreet> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("  [ERR] Failed to read {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    if let Ok(list) = serde_json::from_str::<Vec<VillaStreet>>(&raw) {
        return list;
    }

    #[derive(serde::Deserialize)]
    struct Envelope {
        #[serde(default)]
        villa_streets: Vec<VillaStreet>,
    }

    match serde_json::from_str::<Envelope>(&raw) {
        Ok(envelope) => envelope.villa_streets,
        Err(e) => {
            eprintln!("  [ERR] Failed to parse {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

fn print_route_summary(route: &PracticeRoute) {
    println!(
        "  Route: {:.1} min, {:.1} km, {}",
        route.duration_minutes,
        route.distance_meters / 1000.0,
        if route.include_motorway {
            "with motorway"
        } else {
            "without motorway"
        }
    );
    println!(
        "  Exam window: {}",
        if route.is_within_exam_window() {
            "within 25-40 min"
        } else {
            "outside 25-40 min"
        }
    );
}

// ============================================================================
// Subcommands
// ============================================================================

fn run_steps(route_path: &PathBuf, verbose: bool) {
    println!("\n{}", "=".repeat(60));
    println!("STEP WALKTHROUGH");
    println!("{}", "=".repeat(60));

    let Some(route) = load_route(route_path) else {
        return;
    };
    print_route_summary(&route);

    let steps = route.parsed_steps();
    println!("\nSteps: {}", steps.len());

    for step in &steps {
        let instruction = if step.instruction.is_empty() {
            "(continue)"
        } else {
            step.instruction.as_str()
        };
        println!(
            "  [{:3}] {:20} {}",
            step.index,
            step.maneuver.as_str(),
            instruction
        );
        if verbose {
            if !step.distance_text.is_empty() || !step.duration_text.is_empty() {
                println!("        {} / {}", step.distance_text, step.duration_text);
            }
            if let Some(end) = step.end {
                println!("        ends at {:.5}, {:.5}", end.lat, end.lng);
            }
            if step.polyline.is_none() {
                println!("        no sub-path, consumer pans to endpoint");
            }
        }
    }

    // Exercise the walkthrough state machine against the parsed steps
    let mut nav = NavigationController::new(steps.len());
    if nav.start_walkthrough() {
        let mut visited = 1;
        while nav.current_step() != Some(steps.len() - 1) {
            nav.next();
            visited += 1;
        }
        println!("\n  Walkthrough visits all {} steps", visited);
    } else {
        println!("\n  Walkthrough not available (no steps)");
    }
}

fn run_overlay(
    route_path: &PathBuf,
    annotations_path: Option<&PathBuf>,
    roads_path: Option<&PathBuf>,
    step_index: Option<usize>,
    verbose: bool,
) {
    println!("\n{}", "=".repeat(60));
    println!("OVERLAY MATCHING");
    println!("{}", "=".repeat(60));

    let Some(route) = load_route(route_path) else {
        return;
    };
    print_route_summary(&route);

    let annotations = annotations_path.map(load_annotations).unwrap_or_default();
    let roads = roads_path.map(load_roads).unwrap_or_default();
    println!(
        "  Candidates: {} annotations, {} roads",
        annotations.len(),
        roads.len()
    );

    let path = match route.decoded_path() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("  [ERR] {}", e);
            return;
        }
    };
    println!("  Route polyline: {} points", path.len());

    let (matched, matched_roads) = match step_index {
        Some(i) => {
            let steps = route.parsed_steps();
            let Some(step) = steps.get(i) else {
                eprintln!("  [ERR] No step {} (route has {})", i, steps.len());
                return;
            };
            println!(
                "\n[Step {}] {}",
                i,
                if step.instruction.is_empty() {
                    "(continue)"
                } else {
                    step.instruction.as_str()
                }
            );
            let near = annotations_near_step(&annotations, step, STEP_INTERSECTION_RADIUS_M);
            let near_roads = filter_roads_near(&roads, &step.anchors(), ROUTE_SPEED_ROAD_RADIUS_M);
            (near, near_roads)
        }
        None => {
            let near = filter_annotations_near(&annotations, &path, ROUTE_INTERSECTION_RADIUS_M);
            let near_roads = filter_roads_near(&roads, &path, ROUTE_SPEED_ROAD_RADIUS_M);
            (near, near_roads)
        }
    };

    let deduped = dedupe_by_grid(&matched, SIGN_DEDUPE_CELL_M);
    println!(
        "\nMatched {} annotations ({} after dedup), {} roads",
        matched.len(),
        deduped.len(),
        matched_roads.len()
    );

    let owned: Vec<Annotation> = deduped.iter().map(|a| (*a).clone()).collect();
    let owned_roads: Vec<RoadSegment> = matched_roads.iter().map(|r| (*r).clone()).collect();
    let plan = plan_overlay(&owned, &owned_roads, &FilterState::default());
    println!(
        "Overlay plan: {} markers, {} road overlays",
        plan.markers.len(),
        plan.roads.len()
    );

    if verbose {
        for marker in &plan.markers {
            println!(
                "  [MARKER] id={:10} {:20} {:.5}, {:.5}",
                marker.id,
                marker.kind.as_str(),
                marker.position.lat,
                marker.position.lng
            );
        }
        for road in &plan.roads {
            println!(
                "  [ROAD]   id={:10} {:30} {} km/h ({:?})",
                road.id, road.name, road.speed_limit_kmh, road.band
            );
        }
    }
}

fn run_drive(route_path: &PathBuf, spacing: f64, limit: usize, verbose: bool) {
    println!("\n{}", "=".repeat(60));
    println!("DRIVE-THROUGH SIMULATION");
    println!("{}", "=".repeat(60));

    let Some(route) = load_route(route_path) else {
        return;
    };
    print_route_summary(&route);

    let path = match route.decoded_path() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("  [ERR] {}", e);
            return;
        }
    };
    println!("  Route polyline: {} points", path.len());
    println!("  Sample spacing: {:.0}m", spacing);

    let samples = routedrill::geo_utils::sample_path_by_spacing(&path, spacing);
    println!("  Samples: {}", samples.len());

    let mut nav = NavigationController::new(route.parsed_steps().len());
    let Some(timer) = nav.start_driving(&path) else {
        println!("\n  Nothing to drive (empty path)");
        return;
    };

    println!();
    let mut frame_no = 0usize;
    while let Some(frame) = nav.drive_tick(timer) {
        if frame_no < limit || verbose {
            println!(
                "  [{:4}] {:.6}, {:.6}  bearing {:5.1}",
                frame_no, frame.position.lat, frame.position.lng, frame.bearing
            );
        } else if frame_no == limit {
            println!("  ... (use --limit or --verbose for all frames)");
        }
        frame_no += 1;
    }
    println!("\n  Emitted {} frames, drive-through exited", frame_no);
}

fn run_trainer(
    annotations_path: &PathBuf,
    villa_path: Option<&PathBuf>,
    state_dir: &PathBuf,
    mark: usize,
    reset: bool,
    seed: Option<u64>,
    verbose: bool,
) {
    println!("\n{}", "=".repeat(60));
    println!("TRAINER SESSION");
    println!("{}", "=".repeat(60));

    let annotations = load_annotations(annotations_path);
    let catalog: Vec<Annotation> = annotations
        .into_iter()
        .filter(|a| a.kind == routedrill::AnnotationKind::PriorityToRight)
        .collect();
    println!("  Catalog: {} priority-to-the-right junctions", catalog.len());

    let streets = villa_path.map(load_villa_streets).unwrap_or_default();
    let street_index = StreetIndex::build(streets);

    let store = FileStore::new(state_dir);
    let mut scheduler = match seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            TrainerScheduler::with_rng(catalog, store, &mut rng)
        }
        None => TrainerScheduler::new(catalog, store),
    };

    if reset {
        scheduler.reset();
        println!("  Progress reset");
    }

    println!(
        "  Progress: {}/{} seen{}",
        scheduler.seen_count(),
        scheduler.total(),
        if scheduler.is_completed() {
            " - completed"
        } else {
            ""
        }
    );

    if verbose {
        println!("\n  Session order: {:?}", scheduler.order_ids());
    }

    for _ in 0..mark {
        if scheduler.is_completed() {
            break;
        }
        let Some(current) = scheduler.current() else {
            break;
        };
        let position = current.position();
        println!(
            "  [SEEN] id={:10} {:.5}, {:.5}{}",
            current.id,
            position.lat,
            position.lng,
            match street_index.describe_junction(&position) {
                Some(info) => format!(
                    "  near {} ({:.0}m), {:.0}m from start",
                    info.street_name, info.distance_m, info.junction_from_start_m
                ),
                None => String::new(),
            }
        );
        scheduler.mark_current_seen();
    }

    println!(
        "\n  Progress: {}/{} seen{}",
        scheduler.seen_count(),
        scheduler.total(),
        if scheduler.is_completed() {
            " - all junctions reviewed"
        } else {
            ""
        }
    );
}
