use clap::Parser;
use data_encoding::HEXLOWER;
use gossip_chain::config::GLOBAL_CONFIG;
use gossip_chain::core::{Block, ProofOfWork, BLOCK_SALT};
use gossip_chain::network::client;
use gossip_chain::utils::current_timestamp;
use gossip_chain::{Command, Opt, Server};
use log::{error, LevelFilter};
use std::process;

fn main() {
    env_logger::builder().filter_level(LevelFilter::Info).init();

    let opt = Opt::parse();

    if let Err(e) = run_command(opt.command) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::StartNode { host, port } => {
            let _server = Server::new(&host, port)?;
            println!("Node serving on {host}:{port}");
            loop {
                std::thread::park();
            }
        }
        // Mining happens here, in the producer process, never on a
        // node's serving path.
        Command::NewBlock {
            host,
            port,
            content,
        } => {
            let mut block = Block::new()?;
            block.set_content(content.into_bytes());
            let header = block.hash(BLOCK_SALT);
            block.set_header(header);

            let mut line = b"new_block ".to_vec();
            line.extend(block.serialize()?);
            let response = client::query(&line, &host, port, GLOBAL_CONFIG.get_query_timeout())?;
            println!("{}", String::from_utf8_lossy(&response));
        }
        Command::QueryBlock { host, port, index } => {
            let line = [b"query_block ".as_slice(), &[index]].concat();
            let response = client::query(&line, &host, port, GLOBAL_CONFIG.get_query_timeout())?;
            match Block::deserialize(&response) {
                Ok(block) => {
                    println!(
                        "index={index} timestamp={} header={} content={:?}",
                        block.get_timestamp(),
                        HEXLOWER.encode(block.get_header()),
                        String::from_utf8_lossy(block.get_content())
                    );
                }
                Err(_) => println!("{}", String::from_utf8_lossy(&response)),
            }
        }
        Command::AddNode {
            host,
            port,
            peer_host,
            peer_port,
        } => {
            let line = format!("add_node {peer_host} {peer_port}").into_bytes();
            let response = client::query(&line, &host, port, GLOBAL_CONFIG.get_query_timeout())?;
            println!("{}", String::from_utf8_lossy(&response));
        }
        Command::RegisterNode {
            host,
            port,
            peer_host,
            peer_port,
        } => {
            let timestamp = current_timestamp()?;
            let payload = format!("{timestamp} {peer_host} {peer_port}");
            let message = ProofOfWork::mine_message(
                payload.as_bytes(),
                GLOBAL_CONFIG.get_register_difficulty(),
                None,
            )?;

            let mut line = b"register_node ".to_vec();
            line.extend(message);
            let response = client::query(&line, &host, port, GLOBAL_CONFIG.get_query_timeout())?;
            println!("{}", String::from_utf8_lossy(&response));
        }
    }
    Ok(())
}
