use radius_proto::auth::{generate_request_authenticator, verify_response_authenticator};
use radius_proto::{Attribute, AttributeType, Code, DecodeOptions, Packet, SharedSecret};
use std::net::{Ipv4Addr, UdpSocket};
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 4 {
        eprintln!("Usage: {} <username> <password> <secret> [server_addr]", args[0]);
        eprintln!("Example: {} alice wonderland testing123 127.0.0.1:1812", args[0]);
        std::process::exit(1);
    }

    let username = &args[1];
    let password = &args[2];
    let secret = SharedSecret::from(args[3].as_str());
    let server_addr = args.get(4).map(|s| s.as_str()).unwrap_or("127.0.0.1:1812");

    println!("RADIUS Client Test");
    println!("==================");
    println!("Server: {}", server_addr);
    println!("Username: {}", username);
    println!();

    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect(server_addr)?;

    let request_auth = generate_request_authenticator();
    let mut packet = Packet::new(Code::AccessRequest, 1, request_auth);
    packet.add_attribute(Attribute::user_name(username.as_str())?);
    packet.add_attribute(Attribute::user_password(password.as_str(), &secret, request_auth)?);
    packet.add_attribute(Attribute::nas_ip_address(Ipv4Addr::LOCALHOST)?);

    let request_data = packet.encode()?;
    println!("Sending Access-Request ({} bytes)...", request_data.len());
    socket.send(&request_data)?;

    let mut buffer = vec![0u8; Packet::MAX_PACKET_SIZE];
    socket.set_read_timeout(Some(Duration::from_secs(5)))?;

    let len = match socket.recv(&mut buffer) {
        Ok(len) => len,
        Err(e) => {
            eprintln!("\nNo response from server: {}", e);
            eprintln!("  Make sure the RADIUS server is running on {}", server_addr);
            return Err(e.into());
        }
    };
    let data = &buffer[..len];
    println!("Received response ({} bytes)", len);

    if !verify_response_authenticator(data, &request_auth, &secret) {
        eprintln!("\nResponse Authenticator mismatch, wrong shared secret?");
        std::process::exit(1);
    }

    let response = Packet::decode(data, &secret, &DecodeOptions::default())?;
    match response.code() {
        Code::AccessAccept => println!("\nAuthentication SUCCESSFUL (Access-Accept)"),
        Code::AccessReject => println!("\nAuthentication FAILED (Access-Reject)"),
        other => println!("\nUnexpected response: {}", other),
    }

    for attr in response.find_all_attributes(AttributeType::ReplyMessage) {
        if let Some(msg) = attr.as_str() {
            println!("  Message: {}", msg);
        }
    }

    println!("\nResponse Details:");
    println!("  Identifier: {}", response.identifier());
    println!("  Attributes: {}", response.attributes().len());
    for attr in response.attributes() {
        println!("    {} = {}", attr.name(), attr.value());
    }

    Ok(())
}
