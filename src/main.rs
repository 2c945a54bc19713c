//src/main.rs
mod cli; // Keep cli module for parsing args

use anyhow::{bail, Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use std::io::stdout;

use route_log_lib::{
    AppService, CategoryFilter, Config, Marker, SortDirection, SortField, ValidationError,
    Workout, WorkoutDraft, WorkoutKind,
};

fn main() -> Result<()> {
    env_logger::init();

    // --- Check for completion generation request FIRST ---
    let cli_args = cli::parse_args(); // Parse arguments once
    let export_csv = cli_args.export_csv;

    if let cli::Commands::GenerateCompletion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command(); // Get the command structure
        let bin_name = cmd.get_name().to_string(); // Get the binary name

        eprintln!("Generating completion script for {}...", shell); // Print to stderr
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout()); // Print script to stdout
        return Ok(()); // Exit after generating script
    }

    // Initialize the application service (loads config and the workout slot)
    let mut service =
        AppService::initialize().context("Failed to initialize application service")?;

    // --- Execute Commands using AppService ---
    match cli_args.command {
        cli::Commands::GenerateCompletion { .. } => {
            // This case is handled above, but keep it exhaustive
            unreachable!("Completion generation should have exited already");
        }

        // --- Workout Entry Commands ---
        cli::Commands::AddRunning {
            lat,
            lng,
            distance,
            duration,
            cadence,
        } => {
            let draft = WorkoutDraft::Running {
                distance,
                duration,
                cadence,
            };
            add_workout_cli(&mut service, [lat, lng], draft)?;
        }
        cli::Commands::AddCycling {
            lat,
            lng,
            distance,
            duration,
            elevation,
        } => {
            let draft = WorkoutDraft::Cycling {
                distance,
                duration,
                elevation,
            };
            add_workout_cli(&mut service, [lat, lng], draft)?;
        }
        cli::Commands::Edit {
            id,
            type_,
            distance,
            duration,
            cadence,
            elevation,
        } => {
            let draft = match type_ {
                cli::WorkoutKindCli::Running => WorkoutDraft::Running {
                    distance,
                    duration,
                    cadence: cadence.context("Missing cadence for a running workout")?,
                },
                cli::WorkoutKindCli::Cycling => WorkoutDraft::Cycling {
                    distance,
                    duration,
                    elevation: elevation.context("Missing elevation for a cycling workout")?,
                },
            };
            match service.edit_workout(&id, draft) {
                Ok(workout) => {
                    println!("Successfully updated workout {} ({}).", workout.id, workout.label());
                    println!("Note: an edited workout moves to the end of the logged order.");
                }
                Err(e) => {
                    if let Some(validation) = e.downcast_ref::<ValidationError>() {
                        println!("{validation}");
                        return Ok(()); // Re-input expected, not a hard failure
                    }
                    bail!("Error editing workout '{}': {}", id, e);
                }
            }
        }
        cli::Commands::Delete { id } => match service.delete_workout(&id) {
            Ok(removed) => println!(
                "Successfully deleted workout {} ({}). Remove its map marker too.",
                removed.id,
                removed.label()
            ),
            Err(e) => bail!("Error deleting workout '{}': {}", id, e),
        },
        cli::Commands::DeleteAll => {
            let count = service.workouts().len();
            match service.delete_all_workouts() {
                Ok(()) => println!("Deleted all {} workout(s) and cleared the store.", count),
                Err(e) => bail!("Error deleting workouts: {}", e),
            }
        }

        // --- View Commands ---
        cli::Commands::List => {
            let view = service.current_view();
            if view.is_empty() {
                println!("No workouts match the current filter.");
            } else if export_csv {
                print_view_csv(&view)?;
            } else {
                print_view_table(&view, &service.config);
            }
        }
        cli::Commands::CycleType => match service.cycle_category() {
            Ok(category) => {
                println!("Category filter: {}", category);
                if category == CategoryFilter::All {
                    println!("Note: pace/speed and cadence/elevation sorts only apply to a single category.");
                }
            }
            Err(e) => bail!("Error saving filter selection: {}", e),
        },
        cli::Commands::CycleSort { field } => {
            let field = cli_field_to_sort_field(field);
            if field.is_category_specific()
                && service.selection().category() == CategoryFilter::All
            {
                println!(
                    "Sort by {} needs a single category; cycle the type filter to running or cycling first.",
                    field
                );
                return Ok(());
            }
            match service.cycle_sort(field) {
                Ok(SortDirection::None) => {
                    println!("Sort by {} cleared; listing in date order.", field);
                }
                Ok(direction) => println!("Sort by {}: {}", field, direction),
                Err(e) => bail!("Error saving sort selection: {}", e),
            }
        }
        cli::Commands::Markers => {
            let markers = service.markers();
            if markers.is_empty() {
                println!("No workouts logged yet.");
            } else {
                print_marker_table(&markers, &service.config);
            }
        }

        // --- Config/Path Commands ---
        cli::Commands::SetZoom { level } => match service.set_map_zoom_level(level) {
            Ok(()) => {
                println!("Successfully set map zoom level to: {}", level);
                println!("Config file updated: {:?}", service.get_config_path());
            }
            Err(e) => bail!("Error setting zoom level: {}", e),
        },
        cli::Commands::StoragePath => {
            println!("Workout store is located at: {:?}", service.get_storage_path());
        }
        cli::Commands::ConfigPath => {
            println!("Config file is located at: {:?}", service.get_config_path());
        }
    }

    Ok(())
}

// --- CLI Specific Helper Functions ---

/// Converts the CLI sort field enum to the lib enum
fn cli_field_to_sort_field(cli_field: cli::SortFieldCli) -> SortField {
    match cli_field {
        cli::SortFieldCli::Distance => SortField::Distance,
        cli::SortFieldCli::Duration => SortField::Duration,
        cli::SortFieldCli::Primary => SortField::Primary,
        cli::SortFieldCli::Secondary => SortField::Secondary,
    }
}

/// Adds a workout and prints the outcome. Validation problems are shown as
/// the form-style field list, not treated as hard failures.
fn add_workout_cli(
    service: &mut AppService,
    coords: [f64; 2],
    draft: WorkoutDraft,
) -> Result<()> {
    match service.add_workout(coords, draft) {
        Ok(workout) => {
            println!(
                "Successfully added '{}' at [{}, {}] ID: {}",
                workout.label(),
                workout.coords[0],
                workout.coords[1],
                workout.id
            );
            Ok(())
        }
        Err(e) => {
            if let Some(validation) = e.downcast_ref::<ValidationError>() {
                println!("{validation}");
                return Ok(());
            }
            bail!("Error adding workout: {}", e);
        }
    }
}

/// Resolves a theme color name, falling back if the config holds a bad name.
fn theme_color(name: &str, fallback: Color) -> Color {
    route_log_lib::parse_color(name)
        .map(Color::from)
        .unwrap_or(fallback)
}

fn kind_color(config: &Config, kind: WorkoutKind) -> Color {
    match kind {
        WorkoutKind::Running => theme_color(&config.theme.running_color, Color::Green),
        WorkoutKind::Cycling => theme_color(&config.theme.cycling_color, Color::Yellow),
    }
}

// --- Table Printing Functions (Remain in CLI) ---

/// Prints the current view in a formatted table.
fn print_view_table(view: &[&Workout], config: &Config) {
    let mut table = Table::new();
    let header_color = theme_color(&config.theme.header_color, Color::Cyan);

    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(header_color),
            Cell::new("Description").fg(header_color),
            Cell::new("Type").fg(header_color),
            Cell::new("Distance (km)").fg(header_color),
            Cell::new("Duration (min)").fg(header_color),
            Cell::new("Pace (min/km)").fg(header_color),
            Cell::new("Speed (km/h)").fg(header_color),
            Cell::new("Cadence (spm)").fg(header_color),
            Cell::new("Elev gain (m)").fg(header_color),
        ]);

    for workout in view {
        let color = kind_color(config, workout.kind());
        let (cadence, elevation) = match workout.kind() {
            WorkoutKind::Running => (Some(workout.secondary_metric()), None),
            WorkoutKind::Cycling => (None, Some(workout.secondary_metric())),
        };
        table.add_row(vec![
            Cell::new(&workout.id),
            Cell::new(workout.label()),
            Cell::new(workout.kind().to_string()).fg(color),
            Cell::new(format!("{}", workout.distance)),
            Cell::new(format!("{}", workout.duration)),
            Cell::new(workout.pace().map_or("-".to_string(), |v| format!("{:.1}", v))),
            Cell::new(workout.speed().map_or("-".to_string(), |v| format!("{:.1}", v))),
            Cell::new(cadence.map_or("-".to_string(), |v| v.to_string())),
            Cell::new(elevation.map_or("-".to_string(), |v| v.to_string())),
        ]);
    }
    println!("{table}");
}

/// Prints the current view as CSV to stdout.
fn print_view_csv(view: &[&Workout]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(stdout());
    writer.write_record([
        "id",
        "date",
        "type",
        "description",
        "distance_km",
        "duration_min",
        "pace_min_km",
        "speed_km_h",
        "cadence_spm",
        "elevation_m",
    ])?;

    for workout in view {
        let (cadence, elevation) = match workout.kind() {
            WorkoutKind::Running => (Some(workout.secondary_metric()), None),
            WorkoutKind::Cycling => (None, Some(workout.secondary_metric())),
        };
        writer.write_record([
            workout.id.clone(),
            workout.date.format("%Y-%m-%d %H:%M").to_string(),
            workout.kind().to_string(),
            workout.label(),
            workout.distance.to_string(),
            workout.duration.to_string(),
            workout.pace().map_or(String::new(), |v| format!("{:.2}", v)),
            workout.speed().map_or(String::new(), |v| format!("{:.2}", v)),
            cadence.map_or(String::new(), |v| v.to_string()),
            elevation.map_or(String::new(), |v| v.to_string()),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Prints marker data (what a map frontend would place) in a table.
fn print_marker_table(markers: &[Marker], config: &Config) {
    let mut table = Table::new();
    let header_color = theme_color(&config.theme.header_color, Color::Cyan);
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(header_color),
            Cell::new("Lat").fg(header_color),
            Cell::new("Lng").fg(header_color),
            Cell::new("Popup label").fg(header_color),
        ]);

    for marker in markers {
        let color = kind_color(config, marker.kind);
        table.add_row(vec![
            Cell::new(&marker.id),
            Cell::new(format!("{:.5}", marker.coords[0])),
            Cell::new(format!("{:.5}", marker.coords[1])),
            Cell::new(&marker.label).fg(color),
        ]);
    }
    println!("{table}");
}
