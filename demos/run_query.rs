// cargo run --example run_query -- localhost 7687 neo4j password

use bolt4::{BoltResult, ConnectParams, Map, Session};
use flexi_logger::Logger;
use log::info;

pub fn main() -> BoltResult<()> {
    Logger::try_with_env_or_str("info")
        .unwrap()
        .start()
        .unwrap_or_else(|e| panic!("logger initialization failed with {e}"));

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "localhost".to_string());
    let port: u16 = args
        .next()
        .map_or(Ok(7687), |s| s.parse())
        .expect("port must be a u16");
    let user = args.next().unwrap_or_else(|| "neo4j".to_string());
    let password = args.next().unwrap_or_else(|| "password".to_string());

    let params = ConnectParams::new(host, port, user, password);
    let mut session = Session::open(&params)?;
    info!(
        "connected to {} (connection_id {:?})",
        session.server_agent().unwrap_or("unknown server"),
        session.connection_id()
    );

    let mut result = session.run("UNWIND range(1, 3) AS n RETURN n", Map::new(), None)?;
    session.pull(&mut result, -1)?;
    session.sync(&mut result)?;

    while let Some(record) = session.take(&mut result)? {
        println!("{record:?}");
    }

    session.close();
    Ok(())
}
