//! CLI argument parsing for draftmark
//!
//! Uses clap for argument parsing.
//! Supports global flags: --store, --format, --quiet, --verbose

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Draftmark - AI-assisted grading with versioned rubrics
#[derive(Parser, Debug)]
#[command(name = "draftmark")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Store directory (defaults to the current directory)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Enable debug-level logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Explicit log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new draftmark store
    Init,

    /// Manage students
    Student {
        #[command(subcommand)]
        command: StudentCommands,
    },

    /// Manage assignments
    Assignment {
        #[command(subcommand)]
        command: AssignmentCommands,
    },

    /// Manage rubric templates, criteria and calibration examples
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },

    /// Manage rubric versions bound to assignments
    Version {
        #[command(subcommand)]
        command: VersionCommands,
    },

    /// Record a student submission (content from --file or stdin)
    Submit {
        /// Assignment ID
        assignment_id: i64,

        /// Student ID
        student_id: i64,

        /// Draft number (defaults to one past the student's latest draft)
        #[arg(long)]
        draft: Option<i64>,

        /// Read submission content from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Grade submissions and inspect results
    Grade {
        #[command(subcommand)]
        command: GradeCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum StudentCommands {
    /// Add a student
    Add {
        /// Student name
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AssignmentCommands {
    /// Add an assignment
    Add {
        /// Assignment title
        title: String,

        /// Free-form description
        #[arg(long)]
        description: Option<String>,

        /// Instructions included verbatim in grading prompts
        #[arg(long)]
        instructions: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// Create a rubric template
    Add {
        /// Template name
        name: String,

        /// Author attribution
        #[arg(long)]
        created_by: Option<String>,
    },

    /// Add a criterion to a template
    Criterion {
        /// Template ID
        template_id: i64,

        /// Criterion name (unique within the template)
        name: String,

        /// What this criterion measures
        #[arg(long)]
        description: String,

        /// Maximum score (must be positive)
        #[arg(long)]
        max_score: i64,
    },

    /// Attach a calibration example to a criterion
    Example {
        /// Criterion ID
        criterion_id: i64,

        /// Example submission text
        #[arg(long)]
        text: String,

        /// Score the example deserves
        #[arg(long)]
        score: i64,

        /// Feedback the example deserves
        #[arg(long)]
        feedback: String,
    },

    /// Show a template with its criteria and examples
    Show {
        /// Template ID
        template_id: i64,
    },

    /// List templates
    List,
}

#[derive(Subcommand, Debug)]
pub enum VersionCommands {
    /// Bind a template to an assignment as a new active version
    Create {
        /// Assignment ID
        assignment_id: i64,

        /// Template ID
        template_id: i64,
    },

    /// Activate an existing version (deactivates all others)
    Activate {
        /// Version ID
        version_id: i64,

        /// Assignment ID the version must belong to
        assignment_id: i64,
    },

    /// List an assignment's versions
    List {
        /// Assignment ID
        assignment_id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum GradeCommands {
    /// Grade one submission against the active rubric
    Run {
        /// Submission ID
        submission_id: i64,
    },

    /// Show the stored grade for a submission
    Show {
        /// Submission ID
        submission_id: i64,
    },

    /// Show grades for every graded submission of an assignment
    Assignment {
        /// Assignment ID
        assignment_id: i64,
    },

    /// Override a feedback row's score and attach teacher feedback
    Review {
        /// Feedback row ID
        feedback_id: i64,

        /// Corrected score
        #[arg(long)]
        score: i64,

        /// Teacher's feedback text
        #[arg(long)]
        feedback: String,
    },

    /// Regrade every submission for an assignment
    Regrade {
        /// Assignment ID
        assignment_id: i64,
    },
}
