use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Register the approval record for an enrollment.
    Create(CreateArgs),
    /// Record the advisor's approve/reject decision.
    Advisor(AdvisorArgs),
    /// Cast a committee member's ballot.
    Vote(VoteArgs),
    /// Administrator status override.
    Override(OverrideArgs),
    /// Show the full approval view for an enrollment.
    Status(EnrollmentArgs),
    /// Show committee voting progress for an enrollment.
    Voting(EnrollmentArgs),
    /// Show the status transition log for an enrollment.
    History(EnrollmentArgs),
    /// List approval records.
    List(ListArgs),
    /// List every status with its label and next states.
    Statuses,
    /// Print the JSON Schema of an output type.
    Schema(SchemaArgs),
}

#[derive(Clone, Debug, Args)]
pub struct EnrollmentArgs {
    pub enrollment: String,
}

#[derive(Clone, Debug, Args)]
pub struct CreateArgs {
    pub enrollment: String,
    /// Advisor id (defaults to the roster's assigned advisor)
    #[arg(long)]
    pub advisor: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct AdvisorArgs {
    pub enrollment: String,
    #[arg(long)]
    pub advisor: String,
    /// approve or reject
    #[arg(long)]
    pub decision: String,
    #[arg(long, default_value = "")]
    pub remarks: String,
}

#[derive(Clone, Debug, Args)]
pub struct VoteArgs {
    pub enrollment: String,
    #[arg(long)]
    pub voter: String,
    /// approve or reject
    #[arg(long)]
    pub decision: String,
    #[arg(long, default_value = "")]
    pub remarks: String,
}

#[derive(Clone, Debug, Args)]
pub struct OverrideArgs {
    pub enrollment: String,
    /// Target status wire name, e.g. doc.approved
    #[arg(long)]
    pub status: String,
    #[arg(long)]
    pub by: String,
    #[arg(long)]
    pub reason: String,
}

#[derive(Clone, Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    pub type_name: String,
}
