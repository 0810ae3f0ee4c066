// client/menu.rs
// Top-level menu loop. Each action runs to completion, prints its outcome and
// hands control back to the menu; nothing but "Quit" or aborting the menu ends it.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{ApiClient, ClientError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateBucket,
    ListBuckets,
    UploadFile,
    DownloadObject,
    DeleteObject,
    DeleteBucket,
    Quit,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::CreateBucket,
        Action::ListBuckets,
        Action::UploadFile,
        Action::DownloadObject,
        Action::DeleteObject,
        Action::DeleteBucket,
        Action::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Action::CreateBucket => "Create a bucket",
            Action::ListBuckets => "List buckets",
            Action::UploadFile => "Upload a file",
            Action::DownloadObject => "Download an object",
            Action::DeleteObject => "Delete an object",
            Action::DeleteBucket => "Delete a bucket",
            Action::Quit => "Quit",
        }
    }
}

pub struct Menu {
    api: ApiClient,
    download_dir: PathBuf,
    theme: ColorfulTheme,
}

impl Menu {
    pub fn new(api: ApiClient, download_dir: PathBuf) -> Self {
        Self {
            api,
            download_dir,
            theme: ColorfulTheme::default(),
        }
    }

    /// Runs until the user quits or aborts the top-level selection.
    pub fn run(&self) -> Result<(), ClientError> {
        let labels: Vec<&str> = Action::ALL.iter().map(|a| a.label()).collect();
        loop {
            println!("======================================");
            let choice = Select::with_theme(&self.theme)
                .with_prompt("Choose an operation")
                .items(&labels)
                .default(0)
                .interact_opt()?;

            let Some(action) = choice.map(|i| Action::ALL[i]) else {
                println!("Cancelled");
                return Ok(());
            };
            if action == Action::Quit {
                println!("Bye!");
                return Ok(());
            }

            debug!(?action, "Running menu action");
            if let Err(e) = self.dispatch(action) {
                println!("Error: {}", e);
            }
        }
    }

    fn dispatch(&self, action: Action) -> Result<(), ClientError> {
        match action {
            Action::CreateBucket => self.create_bucket(),
            Action::ListBuckets => self.list_buckets(),
            Action::UploadFile => self.upload_file(),
            Action::DownloadObject => self.download_object(),
            Action::DeleteObject => self.delete_object(),
            Action::DeleteBucket => self.delete_bucket(),
            Action::Quit => Ok(()),
        }
    }

    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<String>, ClientError> {
        let index = Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact_opt()?;
        Ok(index.map(|i| items[i].clone()))
    }

    /// `None` when there are no buckets or the selection was aborted.
    fn pick_bucket(&self, prompt: &str) -> Result<Option<String>, ClientError> {
        let buckets = self.api.list_buckets()?;
        if buckets.is_empty() {
            println!("No buckets available");
            return Ok(None);
        }
        self.select(prompt, &buckets)
    }

    fn pick_object(&self, bucket: &str, prompt: &str) -> Result<Option<String>, ClientError> {
        let objects = self.api.list_objects(bucket)?;
        if objects.is_empty() {
            println!("No objects in this bucket");
            return Ok(None);
        }
        self.select(prompt, &objects)
    }

    fn create_bucket(&self) -> Result<(), ClientError> {
        let bucket: String = Input::with_theme(&self.theme)
            .with_prompt("Bucket name")
            .interact_text()?;
        self.api.create_bucket(&bucket)?;
        println!("Bucket created: {}", bucket);
        Ok(())
    }

    fn list_buckets(&self) -> Result<(), ClientError> {
        let buckets = self.api.list_buckets()?;
        print!("{}", format_bucket_list(&buckets));
        Ok(())
    }

    fn upload_file(&self) -> Result<(), ClientError> {
        let Some(bucket) = self.pick_bucket("Select a bucket")? else {
            return Ok(());
        };
        let path: String = Input::with_theme(&self.theme)
            .with_prompt("File to upload")
            .interact_text()?;
        let key = self.api.upload_file(&bucket, Path::new(path.trim()))?;
        println!("File uploaded: {} to bucket {}", key, bucket);
        Ok(())
    }

    fn download_object(&self) -> Result<(), ClientError> {
        let Some(bucket) = self.pick_bucket("Select a bucket")? else {
            return Ok(());
        };
        let Some(key) = self.pick_object(&bucket, "Select an object")? else {
            return Ok(());
        };
        let target = self.api.download_to(&bucket, &key, &self.download_dir)?;
        println!("Object downloaded: {}", target.display());
        Ok(())
    }

    fn delete_object(&self) -> Result<(), ClientError> {
        let Some(bucket) = self.pick_bucket("Select a bucket")? else {
            return Ok(());
        };
        let Some(key) = self.pick_object(&bucket, "Select an object to delete")? else {
            return Ok(());
        };
        self.api.delete_object(&bucket, &key)?;
        println!("Object deleted: {}", key);
        Ok(())
    }

    fn delete_bucket(&self) -> Result<(), ClientError> {
        let Some(bucket) = self.pick_bucket("Select a bucket to delete")? else {
            return Ok(());
        };
        self.api.delete_bucket(&bucket)?;
        println!("Bucket deleted: {}", bucket);
        Ok(())
    }
}

fn format_bucket_list(buckets: &[String]) -> String {
    if buckets.is_empty() {
        return "No buckets available\n".to_string();
    }
    let mut out = String::from("Available buckets:\n");
    for bucket in buckets {
        out.push_str(&format!(" - {}\n", bucket));
    }
    out
}
