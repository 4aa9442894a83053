use clap::{Parser, Subcommand};
use coursehub::Config;
use coursehub::model::entity::{
    Course, CourseCreate, CourseLevel, Lesson, LessonCreate, Module, ModuleCreate, UserEntity,
    UserEntityCreate,
};
use coursehub::model::{CrudRepository, DatabaseError, DbConnection, ModelManager};
use coursehub::web::{AuthenticatedUser, UserRole};

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling the course DB", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage modules
    Module {
        #[command(subcommand)]
        action: ModuleCommands,
    },

    /// Manage lessons
    Lesson {
        #[command(subcommand)]
        action: LessonCommands,
    },
}

/// User management
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// admin, instructor or student
        #[arg(long, default_value = "student")]
        role: String,
    },
    SetRole {
        #[arg(long)]
        email: String,
        #[arg(long)]
        role: String,
    },
}

/// Course management
#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    Add {
        /// Email of the instructor owning the course
        #[arg(long)]
        instructor: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "beginner")]
        level: String,
        #[arg(long, default_value_t = 0.0)]
        price: f64,
    },
    /// Publishes and approves a course
    Publish {
        #[arg(long)]
        title: String,
    },
}

/// Module management
#[derive(Subcommand, Debug)]
pub enum ModuleCommands {
    Add {
        /// Course title to attach the module to
        #[arg(long)]
        course_title: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        order_index: Option<i32>,
    },
}

/// Lesson management
#[derive(Subcommand, Debug)]
pub enum LessonCommands {
    Add {
        #[arg(long)]
        course_title: String,
        /// Module title to attach the lesson to
        #[arg(long)]
        module_title: String,
        #[arg(long)]
        title: String,
        /// Path to a Markdown file with lesson content
        #[arg(long)]
        file: String,
        #[arg(long)]
        video_url: Option<String>,
        /// Length in seconds
        #[arg(long, default_value_t = 0)]
        duration: i32,
        #[arg(long)]
        order_index: Option<i32>,
    },
}

fn not_found() -> DatabaseError {
    DatabaseError::SqlxError(sqlx::Error::RowNotFound)
}

fn parse_role(role: &str) -> UserRole {
    UserRole::parse(role).unwrap_or_else(|| {
        eprintln!("unknown role `{role}`, expected admin, instructor or student");
        std::process::exit(2);
    })
}

async fn course_id_by_title(mm: &ModelManager, title: &str) -> Result<uuid::Uuid, DatabaseError> {
    sqlx::query_scalar("SELECT id FROM courses WHERE title = $1")
        .bind(title)
        .fetch_optional(mm.executor())
        .await?
        .ok_or_else(not_found)
}

#[tokio::main]
async fn main() -> coursehub::error::AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let database_uri = match std::env::var("DATABASE_URL") {
        Ok(uri) => uri,
        Err(_) => Config::get_or_init(true).await.app().database_uri().to_string(),
    };

    let db_con = DbConnection::connect(&database_uri)?;
    db_con.migrate().await?;
    let mm = ModelManager::new(db_con);
    let actor = AuthenticatedUser::admin();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add {
                name,
                email,
                password,
                role,
            } => {
                let user = UserEntity::create(
                    &mm,
                    &actor,
                    UserEntityCreate {
                        name,
                        email: email.trim().to_lowercase(),
                        password_hash: Some(coursehub::auth::hash_password(&password)?),
                        role: parse_role(&role),
                        avatar: None,
                        google_id: None,
                    },
                )
                .await?;
                println!("User created: {:?}", user);
            }
            UserCommands::SetRole { email, role } => {
                let user = UserEntity::find_by_email(&mm, &actor, &email.trim().to_lowercase())
                    .await?
                    .ok_or_else(not_found)?
                    .set_role(&mm, &actor, parse_role(&role))
                    .await?;
                println!("User updated: {:?}", user);
            }
        },

        Commands::Course { action } => match action {
            CourseCommands::Add {
                instructor,
                title,
                description,
                category,
                level,
                price,
            } => {
                let owner = UserEntity::find_by_email(&mm, &actor, &instructor.trim().to_lowercase())
                    .await?
                    .ok_or_else(not_found)?;
                let owner = AuthenticatedUser::new(owner.id(), owner.role());

                let level = CourseLevel::parse(&level).unwrap_or_else(|| {
                    eprintln!("unknown level `{level}`, expected beginner, intermediate or advanced");
                    std::process::exit(2);
                });

                let course = Course::create(
                    &mm,
                    &owner,
                    CourseCreate {
                        title,
                        description,
                        category,
                        level,
                        price,
                        thumbnail: None,
                    },
                )
                .await?;
                println!("Course created: {:?}", course);
            }
            CourseCommands::Publish { title } => {
                let course_id = course_id_by_title(&mm, &title).await?;
                let course = Course::find_by_id(&mm, &actor, course_id)
                    .await?
                    .ok_or_else(not_found)?
                    .set_published(&mm, &actor, true)
                    .await?
                    .set_approved(&mm, &actor, true)
                    .await?;
                println!("Course published: {:?}", course);
            }
        },

        Commands::Module { action } => match action {
            ModuleCommands::Add {
                course_title,
                title,
                description,
                order_index,
            } => {
                let course_id = course_id_by_title(&mm, &course_title).await?;
                let module = Module::create(
                    &mm,
                    &actor,
                    ModuleCreate {
                        course_id,
                        title,
                        description,
                        order_index,
                    },
                )
                .await?;
                println!("Module created: {:?}", module);
            }
        },

        Commands::Lesson { action } => match action {
            LessonCommands::Add {
                course_title,
                module_title,
                title,
                file,
                video_url,
                duration,
                order_index,
            } => {
                let course_id = course_id_by_title(&mm, &course_title).await?;
                let module = Module::find_by_title(&mm, &actor, course_id, &module_title)
                    .await?
                    .ok_or_else(not_found)?;

                let content = std::fs::read_to_string(file)?;
                let lesson = Lesson::create(
                    &mm,
                    &actor,
                    LessonCreate {
                        module_id: module.id(),
                        title,
                        content,
                        video_url,
                        duration,
                        order_index,
                    },
                )
                .await?;
                println!("Lesson created: {:?}", lesson);
            }
        },
    }

    Ok(())
}
