// Rate limiting for the GraphQL routes using tower-governor
//
// Requests are keyed by peer address (the server is served with
// ConnectInfo<SocketAddr>). The layer itself is assembled in app.rs.

/// Steady-state requests per second per peer
pub const GRAPHQL_REQUESTS_PER_SECOND: u64 = 10;

/// Requests a peer may burst above the steady rate
pub const GRAPHQL_BURST_SIZE: u32 = 20;
