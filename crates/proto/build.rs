// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The transport constructors are skipped: the generated `connect`
    // helper would collide with the Connect rpc on the Logger client.
    tonic_build::configure()
        .build_transport(false)
        .compile_protos(&["proto/logger.proto"], &["proto"])?;
    Ok(())
}
