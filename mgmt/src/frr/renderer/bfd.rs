// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Config renderer: BFD profiles

use crate::frr::renderer::builder::{ConfigBuilder, MARKER, Render};
use config::internal::BfdProfile;

impl Render for BfdProfile {
    type Context = ();
    type Output = ConfigBuilder;
    fn render(&self, _: &Self::Context) -> Self::Output {
        let mut cfg = ConfigBuilder::new();
        cfg += format!(" profile {}", self.name);
        if let Some(value) = self.receive_interval {
            cfg += format!("  receive-interval {value}");
        }
        if let Some(value) = self.transmit_interval {
            cfg += format!("  transmit-interval {value}");
        }
        if let Some(value) = self.detect_multiplier {
            cfg += format!("  detect-multiplier {value}");
        }
        if self.echo_mode {
            cfg += "  echo-mode";
        }
        if let Some(value) = self.echo_interval {
            cfg += format!("  echo transmit-interval {value}");
        }
        if self.passive_mode {
            cfg += "  passive-mode";
        }
        if let Some(value) = self.minimum_ttl {
            cfg += format!("  minimum-ttl {value}");
        }
        cfg += " exit";
        cfg
    }
}

impl Render for Vec<BfdProfile> {
    type Context = ();
    type Output = ConfigBuilder;
    fn render(&self, _: &Self::Context) -> Self::Output {
        let mut cfg = ConfigBuilder::new();
        if self.is_empty() {
            return cfg;
        }
        cfg += "bfd";
        self.iter().for_each(|profile| cfg += profile.render(&()));
        cfg += "exit";
        cfg += MARKER;
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bfd_render() {
        let profiles = vec![
            BfdProfile::new("fast")
                .set_receive_interval(100)
                .set_transmit_interval(150)
                .set_detect_multiplier(3)
                .set_echo_mode(true)
                .set_echo_interval(50)
                .set_passive_mode(true)
                .set_minimum_ttl(254),
            BfdProfile::new("plain"),
        ];
        let expected = "\
bfd
 profile fast
  receive-interval 100
  transmit-interval 150
  detect-multiplier 3
  echo-mode
  echo transmit-interval 50
  passive-mode
  minimum-ttl 254
 exit
 profile plain
 exit
exit
!
";
        assert_eq!(profiles.render(&()).to_string(), expected);
        assert!(Vec::<BfdProfile>::new().render(&()).is_empty());
    }
}
