//! Gateway discovery from `route print 128.0.0.0 -4` output.
//!
//! A tunnel that is up installs a split-default route `128.0.0.0/1`, so the
//! filtered listing shows exactly that route under "Active Routes":
//!
//! ```text
//! IPv4 Route Table
//! ===========================================================================
//! Active Routes:
//! Network Destination        Netmask          Gateway       Interface  Metric
//!         128.0.0.0        128.0.0.0   10.173.172.133   10.173.172.134     35
//! ===========================================================================
//! ```
//!
//! When the tunnel is down the section reads `None` instead.

use splitroute_types::IpAddress;
use tracing::debug;

use crate::error::{Result, RouteSyncError};

const V4_TABLE_MARKER: &str = "IPv4 Route Table";
const ACTIVE_ROUTES_MARKER: &str = "Active Routes";
const COLUMN_HEADER_MARKER: &str = "Network Destination";
const NO_ROUTES_MARKER: &str = "None";
const ROW_COLUMNS: usize = 5;

/// Position of the scanner within the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTableState {
    Searching,
    FoundV4Table,
    FoundActiveRoutesHeader,
    FoundNetworkRow,
    NoThirdPartyRoute,
}

impl RouteTableState {
    /// Numeric code of the state (-1 for the offline state).
    pub const fn code(&self) -> i8 {
        match self {
            RouteTableState::Searching => 0,
            RouteTableState::FoundV4Table => 1,
            RouteTableState::FoundActiveRoutesHeader => 2,
            RouteTableState::FoundNetworkRow => 3,
            RouteTableState::NoThirdPartyRoute => -1,
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            RouteTableState::FoundNetworkRow | RouteTableState::NoThirdPartyRoute
        )
    }

    /// Consumes one line of output and returns the next state.
    pub fn advance(self, line: &str) -> Self {
        match self {
            RouteTableState::Searching if line.starts_with(V4_TABLE_MARKER) => {
                RouteTableState::FoundV4Table
            }
            RouteTableState::FoundV4Table if line.starts_with(ACTIVE_ROUTES_MARKER) => {
                RouteTableState::FoundActiveRoutesHeader
            }
            RouteTableState::FoundActiveRoutesHeader => {
                let line = line.trim();
                if line == NO_ROUTES_MARKER {
                    RouteTableState::NoThirdPartyRoute
                } else if line.starts_with(COLUMN_HEADER_MARKER) || line.len() < 2 {
                    self
                } else {
                    RouteTableState::FoundNetworkRow
                }
            }
            other => other,
        }
    }
}

/// The route found under "Active Routes".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTableSnapshot {
    pub gateway: IpAddress,
    pub interface: String,
    pub metric: u32,
    pub state: RouteTableState,
}

/// Extracts the tunnel's gateway from route table text.
///
/// # Errors
///
/// * [`RouteSyncError::TunnelOffline`] if the active routes section is `None`
/// * [`RouteSyncError::InvalidRouteTableOutput`] if the route row is malformed
///   or the text ends before the active routes are found
pub fn parse_route_table(text: &str) -> Result<RouteTableSnapshot> {
    let mut state = RouteTableState::Searching;

    for line in text.lines() {
        state = state.advance(line);
        match state {
            RouteTableState::FoundNetworkRow => return parse_row(line.trim(), state),
            RouteTableState::NoThirdPartyRoute => {
                debug!(code = state.code(), "Active routes section is empty");
                return Err(RouteSyncError::TunnelOffline);
            }
            _ => {}
        }
    }

    Err(RouteSyncError::invalid_output(format!(
        "output ended while scanning (state {})",
        state.code()
    )))
}

fn parse_row(row: &str, state: RouteTableState) -> Result<RouteTableSnapshot> {
    let columns: Vec<&str> = row.split_whitespace().collect();
    if columns.len() != ROW_COLUMNS {
        return Err(RouteSyncError::invalid_output(format!(
            "expected {} columns in route row '{}', found {}",
            ROW_COLUMNS,
            row,
            columns.len()
        )));
    }

    let gateway: IpAddress = columns[2].parse().map_err(|_| {
        RouteSyncError::invalid_output(format!("gateway '{}' is not an address", columns[2]))
    })?;
    let metric: u32 = columns[4].parse().map_err(|_| {
        RouteSyncError::invalid_output(format!("metric '{}' is not a number", columns[4]))
    })?;

    Ok(RouteTableSnapshot {
        gateway,
        interface: columns[3].to_string(),
        metric,
        state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ONLINE: &str = "\
===========================================================================
Interface List
 12...00 ff 3a 3b 4c 5d ......TAP-Windows Adapter V9
  1...........................Software Loopback Interface 1
===========================================================================

IPv4 Route Table
===========================================================================
Active Routes:
Network Destination        Netmask          Gateway       Interface  Metric
        128.0.0.0        128.0.0.0   10.173.172.133   10.173.172.134     35
===========================================================================
Persistent Routes:
  None
";

    const OFFLINE: &str = "\
IPv4 Route Table
===========================================================================
Active Routes:
  None

Persistent Routes:
  None
";

    #[test]
    fn test_gateway_extracted() {
        let snapshot = parse_route_table(ONLINE).unwrap();
        assert_eq!(snapshot.gateway.to_string(), "10.173.172.133");
        assert_eq!(snapshot.interface, "10.173.172.134");
        assert_eq!(snapshot.metric, 35);
        assert_eq!(snapshot.state, RouteTableState::FoundNetworkRow);
        assert_eq!(snapshot.state.code(), 3);
    }

    #[test]
    fn test_windows_line_endings() {
        let text = ONLINE.replace('\n', "\r\n");
        let snapshot = parse_route_table(&text).unwrap();
        assert_eq!(snapshot.gateway.to_string(), "10.173.172.133");
    }

    #[test]
    fn test_none_means_offline() {
        let err = parse_route_table(OFFLINE).unwrap_err();
        assert!(matches!(err, RouteSyncError::TunnelOffline));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_blank_lines_after_header_are_skipped() {
        let text = "\
IPv4 Route Table
Active Routes:


Network Destination        Netmask          Gateway       Interface  Metric
        128.0.0.0        128.0.0.0         10.8.0.1         10.8.0.2    257
";
        let snapshot = parse_route_table(text).unwrap();
        assert_eq!(snapshot.gateway.to_string(), "10.8.0.1");
        assert_eq!(snapshot.metric, 257);
    }

    #[test]
    fn test_wrong_column_count_is_invalid() {
        let text = "\
IPv4 Route Table
Active Routes:
        128.0.0.0        128.0.0.0   10.173.172.133     35
";
        let err = parse_route_table(text).unwrap_err();
        assert!(matches!(err, RouteSyncError::InvalidRouteTableOutput { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_unparsable_gateway_is_invalid() {
        let text = "\
IPv4 Route Table
Active Routes:
        128.0.0.0        128.0.0.0         On-link    10.173.172.134     35
";
        assert!(matches!(
            parse_route_table(text),
            Err(RouteSyncError::InvalidRouteTableOutput { .. })
        ));
    }

    #[test]
    fn test_truncated_output_is_invalid() {
        for text in ["", "IPv4 Route Table\n", "IPv4 Route Table\nActive Routes:\n\n"] {
            assert!(matches!(
                parse_route_table(text),
                Err(RouteSyncError::InvalidRouteTableOutput { .. })
            ));
        }
    }

    #[test]
    fn test_markers_must_appear_in_order() {
        // "Active Routes" before the table header is ignored.
        let text = "Active Routes:\n  None\nIPv4 Route Table\n";
        assert!(matches!(
            parse_route_table(text),
            Err(RouteSyncError::InvalidRouteTableOutput { .. })
        ));
    }

    #[test]
    fn test_state_transitions() {
        let state = RouteTableState::Searching;
        assert_eq!(state.advance("random"), RouteTableState::Searching);
        let state = state.advance("IPv4 Route Table");
        assert_eq!(state, RouteTableState::FoundV4Table);
        let state = state.advance("Active Routes:");
        assert_eq!(state.code(), 2);
        assert_eq!(state.advance("  "), state);
        assert_eq!(state.advance("  None  "), RouteTableState::NoThirdPartyRoute);
        assert!(RouteTableState::NoThirdPartyRoute.is_terminal());
        assert_eq!(RouteTableState::NoThirdPartyRoute.code(), -1);
        assert_eq!(
            RouteTableState::NoThirdPartyRoute.advance("IPv4 Route Table"),
            RouteTableState::NoThirdPartyRoute
        );
    }
}
