//! Fixed bootstrap peers.
//!
//! Seed entries are handed to address management as if they had been seen a
//! while ago, so any peer learned live outranks them.

use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::time::{SystemTime, UNIX_EPOCH};

use pagarex_consensus::constants::ONE_WEEK;
use pagarex_consensus::SeedSpec6;
use rand::Rng;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SeedAddress {
    pub addr: SocketAddr,
    /// Synthetic unix time in `[now - 2 weeks, now - 1 week]`.
    pub last_seen: i64,
}

/// IPv4-mapped entries come back as plain IPv4 socket addresses.
pub fn seed_socket_addr(spec: &SeedSpec6) -> SocketAddr {
    let ip = Ipv6Addr::from(spec.addr);
    let ip = match ip.to_ipv4_mapped() {
        Some(v4) => IpAddr::V4(v4),
        None => IpAddr::V6(ip),
    };
    SocketAddr::new(ip, spec.port)
}

pub fn convert_seed6<R: Rng + ?Sized>(
    table: &[SeedSpec6],
    now: i64,
    rng: &mut R,
) -> Vec<SeedAddress> {
    table
        .iter()
        .map(|spec| SeedAddress {
            addr: seed_socket_addr(spec),
            last_seen: now - rng.gen_range(0..ONE_WEEK) - ONE_WEEK,
        })
        .collect()
}

/// [`convert_seed6`] against the wall clock and the thread RNG.
pub fn fixed_seed_addresses(table: &[SeedSpec6]) -> Vec<SeedAddress> {
    convert_seed6(table, unix_now(), &mut rand::thread_rng())
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagarex_consensus::{chain_params, Network};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn mapped_ipv4_surfaces_as_ipv4() {
        let spec = SeedSpec6::ipv4([91, 92, 136, 77], 44_250);
        assert_eq!(
            seed_socket_addr(&spec),
            "91.92.136.77:44250".parse::<SocketAddr>().expect("addr")
        );

        let mut raw = [0u8; 16];
        raw[0] = 0x20;
        raw[1] = 0x01;
        raw[15] = 0x01;
        let spec = SeedSpec6 {
            addr: raw,
            port: 8_333,
        };
        assert_eq!(
            seed_socket_addr(&spec),
            "[2001::1]:8333".parse::<SocketAddr>().expect("addr")
        );
    }

    #[test]
    fn last_seen_falls_in_second_week_back() {
        let table = chain_params(Network::Mainnet).fixed_seeds;
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            for address in convert_seed6(table, NOW, &mut rng) {
                assert!(address.last_seen >= NOW - 2 * ONE_WEEK);
                assert!(address.last_seen <= NOW - ONE_WEEK);
            }
        }
    }

    #[test]
    fn addresses_are_stable_across_rng_streams() {
        let table = chain_params(Network::Mainnet).fixed_seeds;
        let first = convert_seed6(table, NOW, &mut StdRng::seed_from_u64(1));
        let second = convert_seed6(table, NOW, &mut StdRng::seed_from_u64(2));
        let addrs = |list: &[SeedAddress]| list.iter().map(|a| a.addr).collect::<Vec<_>>();
        assert_eq!(addrs(&first), addrs(&second));
        assert_ne!(first, second);
        assert_eq!(first.len(), 3);
        assert_eq!(first[1].addr.to_string(), "85.217.170.89:44250");
    }

    #[test]
    fn same_rng_seed_is_reproducible() {
        let table = chain_params(Network::Mainnet).fixed_seeds;
        let first = convert_seed6(table, NOW, &mut StdRng::seed_from_u64(9));
        let second = convert_seed6(table, NOW, &mut StdRng::seed_from_u64(9));
        assert_eq!(first, second);
    }

    #[test]
    fn empty_table_yields_nothing() {
        let table = chain_params(Network::Testnet).fixed_seeds;
        assert!(convert_seed6(table, NOW, &mut StdRng::seed_from_u64(0)).is_empty());
        assert!(fixed_seed_addresses(table).is_empty());
    }
}
