//! Terminal console for the student administration API.

use std::str::FromStr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use student_admin::client::{
    ClientError, CollectionView, Controller, HttpTransport, Record, SortSpec, StudentSummary,
};
use student_admin::models::{Assignment, Class, Student, Subject, Teacher};

#[derive(Parser, Debug)]
#[command(name = "student-admin-cli", version, about = "Manage classes, students, teachers and subjects")]
struct Cli {
    /// Base URL of the API server
    #[arg(long, env = "STUDENT_ADMIN_URL", default_value = "http://localhost:8000")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage classes
    Classes {
        #[command(subcommand)]
        action: Action,
    },
    /// Manage students
    Students {
        #[command(subcommand)]
        action: Action,
    },
    /// Manage teachers
    Teachers {
        #[command(subcommand)]
        action: Action,
    },
    /// Manage subjects
    Subjects {
        #[command(subcommand)]
        action: Action,
    },
    /// Manage teacher assignments
    Assignments {
        #[command(subcommand)]
        action: Action,
    },
    /// Assign several subjects of a class to one teacher
    Assign {
        teacher_id: i64,
        class_number: i64,
        /// Subject IDs to assign
        #[arg(required = true)]
        subject_ids: Vec<i64>,
    },
}

#[derive(Subcommand, Debug, Clone)]
enum Action {
    /// List the collection
    List {
        /// Only show rows matching this text
        #[arg(short, long)]
        search: Option<String>,
        /// Column to sort by
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        /// Page to show
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        /// Only rows of this class (students, subjects and assignments)
        #[arg(short, long)]
        class: Option<i64>,
    },
    /// Create a row from a JSON payload
    Create {
        #[arg(long)]
        json: String,
    },
    /// Update a row from a JSON payload
    Update {
        id: i64,
        #[arg(long)]
        json: String,
    },
    /// Delete a row
    Delete { id: i64 },
}

fn print_message(message: Option<String>) {
    println!("{}", message.unwrap_or_else(|| "Done".to_string()));
}

fn print_page<R: Record>(view: &CollectionView<R>) {
    let page = view.page();
    if page.items.is_empty() {
        println!("No rows found");
        return;
    }

    for item in &page.items {
        println!("{}", item.row());
    }
    println!(
        "Page {} of {} ({} rows){}{}",
        page.number,
        page.total_pages,
        page.total_items,
        if page.has_previous { ", previous available" } else { "" },
        if page.has_next { ", next available" } else { "" },
    );
}

async fn run<R, F>(
    transport: &HttpTransport,
    action: Action,
    class_path: Option<String>,
    after_list: F,
) -> Result<(), ClientError>
where
    R: Record,
    R::SortKey: FromStr<Err = String>,
    F: Fn(&CollectionView<R>),
{
    let mut controller = Controller::<R, _>::new(transport);

    match action {
        Action::List {
            search,
            sort,
            desc,
            page,
            ..
        } => {
            match class_path {
                Some(path) => controller.load_from(&path).await?,
                None => controller.load().await?,
            };

            if let Some(search) = search {
                controller.view_mut().set_filter(R::search_filter(&search));
            }
            if let Some(sort) = sort {
                let key = sort.parse::<R::SortKey>().map_err(ClientError::Validation)?;
                let spec = if desc {
                    SortSpec::descending(key)
                } else {
                    SortSpec::ascending(key)
                };
                controller.view_mut().sort_by(spec);
            }
            controller.view_mut().go_to_page(page);

            print_page(controller.view());
            after_list(controller.view());
        }
        Action::Create { json } => {
            let form: R::Form = serde_json::from_str(&json)?;
            print_message(controller.create(&form).await?);
        }
        Action::Update { id, json } => {
            let form: R::UpdateForm = serde_json::from_str(&json)?;
            controller.load().await?;
            print_message(controller.update(id, &form).await?);
        }
        Action::Delete { id } => {
            controller.load().await?;
            print_message(controller.delete(id).await?);
        }
    }

    Ok(())
}

fn class_filter(action: &Action, path: impl Fn(i64) -> String) -> Option<String> {
    match action {
        Action::List {
            class: Some(class), ..
        } => Some(path(*class)),
        _ => None,
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // Controller futures are not Send, so everything runs on one thread.
    rocket::tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?
        .block_on(execute(cli))
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let transport = HttpTransport::new(&cli.server);

    let result = match cli.command {
        Command::Classes { action } => run::<Class, _>(&transport, action, None, |_| {}).await,
        Command::Students { action } => {
            let class_path = class_filter(&action, |class| format!("/class/{}", class));
            run::<Student, _>(&transport, action, class_path, |view| {
                let summary = StudentSummary::of(view.filtered());
                println!(
                    "Total: {}  Male: {}  Female: {}  Average age: {:.1}",
                    summary.total, summary.male, summary.female, summary.average_age
                );
            })
            .await
        }
        Command::Teachers { action } => run::<Teacher, _>(&transport, action, None, |_| {}).await,
        Command::Subjects { action } => {
            let class_path = class_filter(&action, |class| format!("/class/{}", class));
            run::<Subject, _>(&transport, action, class_path, |_| {}).await
        }
        Command::Assignments { action } => {
            let class_path = class_filter(&action, |class| format!("?class_number={}", class));
            run::<Assignment, _>(&transport, action, class_path, |_| {}).await
        }
        Command::Assign {
            teacher_id,
            class_number,
            subject_ids,
        } => {
            let mut controller = Controller::<Assignment, _>::new(&transport);
            match controller.load().await {
                Ok(_) => controller
                    .assign_subjects(teacher_id, class_number, &subject_ids)
                    .await
                    .map(|created| println!("Created {} assignment(s)", created)),
                Err(err) => Err(err),
            }
        }
    };

    result.with_context(|| format!("Request to {} failed", transport.base_url()))
}
