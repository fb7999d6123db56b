use std::sync::Arc;

use crate::{
    auth::jwt::JwtKeys,
    clock::{Clock, SystemClock},
    config::AppConfig,
    db,
    ids::IdGenerator,
    stacks::{
        locks::StackLocks,
        repo::{PgStackRepo, StackRepo},
    },
    users::repo::{PgUserRepo, UserRepo},
    verification::{
        code::CodeGenerator,
        mailer::{Mailer, SmtpMailer},
        repo::{PgVerificationRepo, VerificationRepo},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub stacks: Arc<dyn StackRepo>,
    pub verifications: Arc<dyn VerificationRepo>,
    pub mailer: Arc<dyn Mailer>,
    pub keys: Arc<JwtKeys>,
    pub codes: Arc<CodeGenerator>,
    pub ids: Arc<IdGenerator>,
    pub clock: Arc<dyn Clock>,
    pub stack_locks: Arc<StackLocks>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db = db::connect(&config).await?;
        db::migrate(&db).await?;

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let mailer = Arc::new(SmtpMailer::new(&config.mail)?) as Arc<dyn Mailer>;

        Ok(Self {
            users: Arc::new(PgUserRepo::new(db.clone())),
            stacks: Arc::new(PgStackRepo::new(db.clone())),
            verifications: Arc::new(PgVerificationRepo::new(db)),
            mailer,
            keys: Arc::new(JwtKeys::new(&config.jwt, clock.clone())),
            codes: Arc::new(CodeGenerator::from_entropy()),
            ids: Arc::new(IdGenerator::new(config.snowflake_node)?),
            clock,
            stack_locks: Arc::new(StackLocks::new(config.serialize_stack_writes)),
            config: Arc::new(config),
        })
    }
}

/// In-memory state plus handles to the fakes behind it.
#[cfg(test)]
pub struct FakeState {
    pub state: AppState,
    pub mailer: Arc<crate::verification::mailer::RecordingMailer>,
    pub clock: Arc<crate::clock::ManualClock>,
}

#[cfg(test)]
impl AppState {
    pub fn fake() -> FakeState {
        Self::fake_with(AppConfig::test())
    }

    pub fn fake_with_serialized_writes() -> FakeState {
        Self::fake_with(AppConfig {
            serialize_stack_writes: true,
            ..AppConfig::test()
        })
    }

    fn fake_with(config: AppConfig) -> FakeState {
        use crate::{
            clock::ManualClock,
            memory::{MemoryStackRepo, MemoryUserRepo, MemoryVerificationRepo},
            verification::mailer::RecordingMailer,
        };

        let mailer = Arc::new(RecordingMailer::default());
        let clock = Arc::new(ManualClock::new(time::macros::datetime!(2024-01-01 0:00 UTC)));

        let state = Self {
            users: Arc::new(MemoryUserRepo::default()),
            stacks: Arc::new(MemoryStackRepo::default()),
            verifications: Arc::new(MemoryVerificationRepo::default()),
            mailer: mailer.clone(),
            keys: Arc::new(JwtKeys::new(&config.jwt, clock.clone())),
            codes: Arc::new(CodeGenerator::seeded(7)),
            ids: Arc::new(IdGenerator::new(config.snowflake_node).expect("test node id")),
            clock: clock.clone(),
            stack_locks: Arc::new(StackLocks::new(config.serialize_stack_writes)),
            config: Arc::new(config),
        };

        FakeState { state, mailer, clock }
    }
}

#[cfg(test)]
impl FakeState {
    /// Inserts an account directly. Its password is always `password1`.
    pub async fn seed_user(
        &self,
        name: &str,
        email: &str,
        role: crate::users::repo_types::UserRole,
        verified: bool,
    ) -> crate::users::repo_types::User {
        let user = crate::users::repo_types::User {
            id: self.state.ids.generate(),
            name: name.into(),
            role,
            email: email.into(),
            password: "password1".into(),
            verified,
        };
        self.state.users.insert(&user).await.expect("seed user");
        user
    }

    /// Bearer token for a seeded user.
    pub fn token_for(&self, user: &crate::users::repo_types::User) -> String {
        self.state.keys.issue(&user.id, user.role).expect("issue token")
    }
}
