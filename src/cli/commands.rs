use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "gossip-chain")]
pub struct Opt {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "startnode", about = "Start a node and serve until killed")]
    StartNode {
        #[arg(help = "Host to bind")]
        host: String,
        #[arg(help = "Port to bind")]
        port: u16,
    },
    #[command(
        name = "newblock",
        about = "Seal a block with the given content and submit it to a node"
    )]
    NewBlock {
        #[arg(help = "Target node host")]
        host: String,
        #[arg(help = "Target node port")]
        port: u16,
        #[arg(help = "Block content")]
        content: String,
    },
    #[command(name = "queryblock", about = "Fetch and print the block at an index")]
    QueryBlock {
        #[arg(help = "Target node host")]
        host: String,
        #[arg(help = "Target node port")]
        port: u16,
        #[arg(help = "Chain index (0-255)")]
        index: u8,
    },
    #[command(name = "addnode", about = "Ask a node to admit a peer after a liveness probe")]
    AddNode {
        #[arg(help = "Target node host")]
        host: String,
        #[arg(help = "Target node port")]
        port: u16,
        #[arg(help = "Peer host to add")]
        peer_host: String,
        #[arg(help = "Peer port to add")]
        peer_port: u16,
    },
    #[command(
        name = "registernode",
        about = "Mine a registration announcement for a peer and gossip it via a node"
    )]
    RegisterNode {
        #[arg(help = "Target node host")]
        host: String,
        #[arg(help = "Target node port")]
        port: u16,
        #[arg(help = "Peer host to announce")]
        peer_host: String,
        #[arg(help = "Peer port to announce")]
        peer_port: u16,
    },
}
