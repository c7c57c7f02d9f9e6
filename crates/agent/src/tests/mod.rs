//! End-to-end agent runs against a scripted chat client.

mod agent_flow;
