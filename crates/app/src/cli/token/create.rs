use clap::{Args, ValueEnum};
use emporium_app::{
    auth::{PgAuthService, Role},
    database,
    domain::users::UserUuid,
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoleArg {
    Buyer,
    Operator,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Buyer => Self::Buyer,
            RoleArg::Operator => Self::Operator,
        }
    }
}

#[derive(Debug, Args)]
pub(crate) struct CreateTokenArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// User the token acts for; generated when omitted
    #[arg(long)]
    user_uuid: Option<Uuid>,

    /// Role granted to the token
    #[arg(long, value_enum, default_value = "buyer")]
    role: RoleArg,
}

pub(crate) async fn run(args: CreateTokenArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let user = args.user_uuid.map_or_else(UserUuid::new, UserUuid::from_uuid);

    let issued = PgAuthService::new(pool)
        .issue_api_token(user, args.role.into())
        .await
        .map_err(|error| format!("failed to create token: {error}"))?;

    println!("token_uuid: {}", issued.record.uuid);
    println!("user_uuid: {}", issued.record.user);
    println!("role: {}", issued.record.role);
    println!("token_created_at: {}", issued.record.created_at);
    println!("api_token: {}", issued.token);
    println!("store this token now; it is only shown once");

    Ok(())
}
