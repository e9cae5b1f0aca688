use log::error;
use promptcast::config::GatewayConfig;

#[tokio::main]
async fn main()
{   env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    ).init();

    let result = match GatewayConfig::from_env()
    {   Ok(config) => promptcast::gateway::serve(config).await
      , Err(e) => Err(e)
    };

    if let Err(e) = result
    {   error!("{}", e);
        std::process::exit(1);
    }
}
