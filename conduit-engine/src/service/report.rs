//! Canned analysis reports
//!
//! Neither report is backed by data: the observability answer only
//! substitutes the version it was asked about.

pub const COMPLIANCE_REPORT: &str = "\
📋 Last Production Deployment - Compliance Report:

**Change Ticket**: CHG-2024-1104-001
**Service**: frontend-production v1.2.3
**Deployed**: Nov 4, 2024 14:23:45

**Approval Chain**:
✅ Developer: john.doe (Requested)
✅ Tech Lead: sarah.chen (Approved - Nov 4, 13:45)
✅ DevOps: mike.wilson (Approved - Nov 4, 14:10)
✅ Security Scan: Passed (No vulnerabilities)
✅ QA Sign-off: jane.smith (Approved - Nov 4, 14:15)

**Compliance Status**: ✅ APPROVED
**Risk Level**: LOW
**Rollback Plan**: Available";

pub fn error_rate_analysis(version: &str) -> String {
    format!(
        "📊 Error Rate Analysis for {version}:

**Root Cause**: Database connection pool exhaustion
**Timeline**:
• 14:23 - Deployment completed
• 14:25 - Error rate spike detected (0.2% → 4.5%)
• 14:27 - Connection pool saturated
• 14:30 - Auto-scaling triggered

**Key Metrics**:
• Peak error rate: 4.5%
• Affected requests: ~1,200
• Average response time: +250ms
• Database connections: 95/100 (max)

**Recommendation**: Increase connection pool size from 100 to 150 before next deployment."
    )
}
