//! `consult roles`: List allowed agent roles.

use consult_core::AgentRole;

pub fn run() {
    for role in AgentRole::ALL {
        println!("{role}");
    }
}
