// Interactive terminal client for the S3 façade.

use clap::Parser;

use s3_facade::ClientConfig;
use s3_facade::client::menu::Menu;
use s3_facade::client::{ApiClient, ClientError};
use s3_facade::logging::init_client_logging;

fn main() -> Result<(), ClientError> {
    init_client_logging();

    let config = ClientConfig::parse();
    let api = ApiClient::new(&config.base_url)?;
    Menu::new(api, config.download_dir).run()
}
