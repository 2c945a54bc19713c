// src/cli.rs
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about = "Log runs and rides on a map, sort and filter them", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output list data as CSV instead of a table
    #[arg(long, global = true)]
    pub export_csv: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkoutKindCli {
    Running,
    Cycling,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortFieldCli {
    Distance,
    Duration,
    /// Pace (running) or speed (cycling)
    Primary,
    /// Cadence (running) or elevation (cycling)
    Secondary,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log a run at a map position
    AddRunning {
        /// Latitude of the clicked map position
        lat: f64,
        /// Longitude of the clicked map position
        lng: f64,
        /// Distance in km
        #[arg(short, long)]
        distance: f64,
        /// Duration in minutes
        #[arg(short = 'u', long)]
        duration: f64,
        /// Cadence in steps per minute
        #[arg(short, long)]
        cadence: f64,
    },
    /// Log a ride at a map position
    AddCycling {
        /// Latitude of the clicked map position
        lat: f64,
        /// Longitude of the clicked map position
        lng: f64,
        /// Distance in km
        #[arg(short, long)]
        distance: f64,
        /// Duration in minutes
        #[arg(short = 'u', long)]
        duration: f64,
        /// Elevation gain in meters
        #[arg(short, long)]
        elevation: f64,
    },
    /// Replace a workout's inputs, keeping its id, date, and map position
    Edit {
        /// Id of the workout to edit
        id: String,
        /// Workout type (may differ from the original)
        #[arg(long = "type", value_enum, id = "workout-type")]
        type_: WorkoutKindCli,
        #[arg(short, long)]
        distance: f64,
        #[arg(short = 'u', long)]
        duration: f64,
        #[arg(short, long, required_if_eq("workout-type", "running"))]
        cadence: Option<f64>,
        #[arg(short, long, required_if_eq("workout-type", "cycling"))]
        elevation: Option<f64>,
    },
    /// Delete one workout
    Delete {
        /// Id of the workout to delete
        id: String,
    },
    /// Delete every workout and remove the storage slot
    DeleteAll,
    /// Show the workout list with the current filter and sort applied
    List,
    /// Advance the category filter: all -> running -> cycling
    CycleType,
    /// Cycle the sort direction for a field (repeat to advance)
    CycleSort {
        #[arg(value_enum)]
        field: SortFieldCli,
    },
    /// Print marker data for the map frontend
    Markers,
    /// Set the zoom level the map opens at
    SetZoom { level: u8 },
    /// Show the path to the workout store file
    StoragePath,
    /// Show the path to the config file
    ConfigPath,
    /// Generate shell completion script
    GenerateCompletion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

// Function to parse CLI arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

// Expose the command structure for completion generation
pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
